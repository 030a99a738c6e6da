// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # vclean Geometry
//!
//! Planar geometry kernel for vector map topology cleaning.
//!
//! This crate provides the low-level primitives the topology layer is built
//! on: axis-aligned bounding boxes, ordered vertex strings ([`PolyLine`]),
//! exact segment/segment intersection with collinear-overlap handling,
//! polyline splitting at intersection points, signed polygon area and
//! even-odd point containment. Everything is 2D: the algorithms that consume
//! this kernel (line breaking, area building, attachment) are strictly
//! planar.
//!
//! Computed intersection points that coincide with a segment endpoint are
//! returned bit-for-bit equal to that endpoint, so coordinate-exact node
//! identity survives a breaking pass.

pub mod area;
pub mod bbox;
pub mod intersect;
pub mod polyline;

pub use area::{point_in_ring, signed_area};
pub use bbox::BoundingBox;
pub use intersect::{
    collapsed_loop_split, segment_crossing, split_at_crossings, SegmentCrossing, SplitResult,
};
pub use polyline::{coord_key, point_segment_distance, PolyLine};

/// Shared 2D point type.
pub type Point = nalgebra::Point2<f64>;
/// Shared 2D vector type.
pub type Vector = nalgebra::Vector2<f64>;
