// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # vclean Topology
//!
//! Planar topology for vector maps: an append-only feature arena with
//! stable 1-based ids, coordinate-exact nodes, line breaking at
//! intersections, and staged building of areas, isles, and attachments.
//!
//! A [`Map`] starts as plain feature storage. [`Map::build`] raises it
//! through the [`BuildLevel`] stages: node topology, boundary cycle tracing
//! into areas and isles, isle and centroid attachment, and finally the
//! category index. Editing the map keeps node topology current and
//! invalidates everything above it.
//!
//! Node identity is exact coordinate match with zero tolerance. The
//! intersection kernel returns endpoint-exact points, so a
//! [`Map::break_lines`] pass followed by a rebuild yields a graph where
//! lines meet only at shared nodes.

pub mod break_lines;
pub mod build;
pub mod error;
pub mod feature;
pub mod map;
pub mod spatial;

pub use build::BuildLevel;
pub use error::{Error, Result};
pub use feature::{Feature, FeatureKind, KindMask};
pub use map::{
    Area, AreaId, FeatureId, Isle, IsleId, LineEnd, LineTopo, Map, Node, NodeId, Side,
};
pub use spatial::SpatialIndex;
