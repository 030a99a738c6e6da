// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the cleaning pipeline.

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown cleaning tool '{0}'")]
    UnknownTool(String),

    #[error("{tools} tools but {thresholds} thresholds; give one per tool or none")]
    ThresholdCount { tools: usize, thresholds: usize },

    #[error("threshold '{0}' is not a number")]
    BadThreshold(String),

    #[error("no cleaning tools given")]
    NoTools,

    #[error(transparent)]
    Topology(#[from] vclean_topology::Error),
}
