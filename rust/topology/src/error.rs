// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

use crate::feature::FeatureKind;
use crate::map::FeatureId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("feature id {0} was never written")]
    NotFound(FeatureId),

    #[error("feature id {0} has been deleted")]
    Deleted(FeatureId),

    #[error("geometry with {got} vertices is too short for a {kind:?} feature")]
    DegenerateGeometry { kind: FeatureKind, got: usize },
}
