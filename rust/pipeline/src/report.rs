// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What a cleaning run did, tool by tool.

use serde::{Deserialize, Serialize};

use crate::tool::Tool;

/// One tool invocation and how many features or vertices it modified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolRun {
    pub tool: Tool,
    pub threshold: f64,
    pub modified: usize,
}

/// Summary of a whole cleaning run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub runs: Vec<ToolRun>,
    /// Combine-mode fixpoint passes; 0 when combine was off or never looped.
    pub passes: usize,
}

impl CleanReport {
    pub fn total_modified(&self) -> usize {
        self.runs.iter().map(|r| r.modified).sum()
    }
}
