// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # vclean Pipeline
//!
//! The cleaning pipeline: a vocabulary of twelve tools that repair common
//! defects in vector maps, and a driver that runs an ordered list of them.
//!
//! Tools work on a [`vclean_topology::Map`] and report how many features or
//! vertices they modified. The driver raises the map to each tool's required
//! build level, optionally repeats the whole list until a pass changes
//! nothing (combine mode, capped at [`MAX_COMBINE_PASSES`]), and can copy
//! removed geometry into a separate error map for inspection.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod tool;
pub mod tools;

pub use error::{PipelineError, Result};
pub use pipeline::{clean, CleanOptions, MAX_COMBINE_PASSES};
pub use report::{CleanReport, ToolRun};
pub use tool::{Tool, ToolSpec};
