// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cleaning tool vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vclean_topology::BuildLevel;

use crate::error::PipelineError;

/// One cleaning tool. Tools run in the order given; most take an optional
/// threshold whose meaning is tool-specific (length, area, distance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Break lines at every mutual and self intersection.
    Break,
    /// Snap vertices to nearby line endpoints within the threshold.
    Snap,
    /// Remove dangles up to the threshold length (all with a negative one).
    Rmdangle,
    /// Turn dangling boundaries into plain lines instead of removing them.
    Chdangle,
    /// Remove bridges: boundaries connecting a face to itself.
    Rmbridge,
    /// Remove duplicate line-like features, keeping the oldest.
    Rmdupl,
    /// Remove duplicate centroids inside one area.
    Rmdac,
    /// Break boundaries at shared polygon vertices.
    Bpol,
    /// Remove vertices displacing the line by less than the threshold.
    Prune,
    /// Merge areas below the threshold size into their longest neighbor.
    Rmarea,
    /// Resolve ends leaving a node at identical angles.
    Rmsa,
    /// Remove zero-length lines and boundaries.
    Rmline,
    /// Join line chains at free degree-2 nodes. Combine-mode follow-up
    /// only, not selectable by name.
    Merge,
}

impl Tool {
    pub const ALL: [Tool; 12] = [
        Tool::Break,
        Tool::Snap,
        Tool::Rmdangle,
        Tool::Chdangle,
        Tool::Rmbridge,
        Tool::Rmdupl,
        Tool::Rmdac,
        Tool::Bpol,
        Tool::Prune,
        Tool::Rmarea,
        Tool::Rmsa,
        Tool::Rmline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Break => "break",
            Tool::Snap => "snap",
            Tool::Rmdangle => "rmdangle",
            Tool::Chdangle => "chdangle",
            Tool::Rmbridge => "rmbridge",
            Tool::Rmdupl => "rmdupl",
            Tool::Rmdac => "rmdac",
            Tool::Bpol => "bpol",
            Tool::Prune => "prune",
            Tool::Rmarea => "rmarea",
            Tool::Rmsa => "rmsa",
            Tool::Rmline => "rmline",
            Tool::Merge => "merge",
        }
    }

    /// Topology a tool needs before it can run.
    pub fn required_level(self) -> BuildLevel {
        match self {
            Tool::Rmdac | Tool::Prune | Tool::Rmarea => BuildLevel::Centroids,
            _ => BuildLevel::Base,
        }
    }

    /// Whether the threshold has any effect.
    pub fn uses_threshold(self) -> bool {
        matches!(
            self,
            Tool::Snap | Tool::Rmdangle | Tool::Chdangle | Tool::Prune | Tool::Rmarea
        )
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| PipelineError::UnknownTool(s.trim().to_string()))
    }
}

/// A tool with its threshold. Tools that ignore the threshold can carry any
/// value; 0 by convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub tool: Tool,
    pub threshold: f64,
}

impl ToolSpec {
    pub fn new(tool: Tool, threshold: f64) -> Self {
        Self { tool, threshold }
    }

    /// Parses comma-separated tool and threshold lists. The threshold list
    /// may be empty (all zero) or must match the tool count.
    pub fn parse_list(tools: &str, thresholds: &str) -> Result<Vec<ToolSpec>, PipelineError> {
        let names: Vec<&str> = tools
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            return Err(PipelineError::NoTools);
        }
        let values: Vec<&str> = thresholds
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !values.is_empty() && values.len() != names.len() {
            return Err(PipelineError::ThresholdCount {
                tools: names.len(),
                thresholds: values.len(),
            });
        }
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let tool = name.parse::<Tool>()?;
                let threshold = match values.get(i) {
                    Some(v) => v
                        .parse::<f64>()
                        .map_err(|_| PipelineError::BadThreshold(v.to_string()))?,
                    None => 0.0,
                };
                Ok(ToolSpec { tool, threshold })
            })
            .collect()
    }
}
