// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Map features: geometry kind, vertex string, category tags.

use vclean_geometry::{Point, PolyLine};

/// The geometric role of a feature. `Line` and `Boundary` carry identical
/// geometry; only boundaries participate in area building. A `Centroid` is a
/// single point that labels the area it falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Point,
    Line,
    Boundary,
    Centroid,
}

impl FeatureKind {
    /// Returns `true` for kinds whose geometry is a vertex string of two or
    /// more points.
    pub fn is_line_like(self) -> bool {
        matches!(self, FeatureKind::Line | FeatureKind::Boundary)
    }

    fn bit(self) -> u8 {
        match self {
            FeatureKind::Point => 1,
            FeatureKind::Line => 2,
            FeatureKind::Boundary => 4,
            FeatureKind::Centroid => 8,
        }
    }
}

/// A set of feature kinds, used to scope selections and cleaning passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMask(u8);

impl KindMask {
    pub const NONE: KindMask = KindMask(0);
    pub const POINTS: KindMask = KindMask(1);
    pub const LINES: KindMask = KindMask(2);
    pub const BOUNDARIES: KindMask = KindMask(4);
    pub const CENTROIDS: KindMask = KindMask(8);
    /// Lines and boundaries: the kinds node topology is built for.
    pub const LINE_LIKE: KindMask = KindMask(2 | 4);
    pub const ALL: KindMask = KindMask(1 | 2 | 4 | 8);

    pub fn of(kind: FeatureKind) -> KindMask {
        KindMask(kind.bit())
    }

    pub fn contains(self, kind: FeatureKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn union(self, other: KindMask) -> KindMask {
        KindMask(self.0 | other.0)
    }

    pub fn restrict(self, other: KindMask) -> KindMask {
        KindMask(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A vector map feature: kind, geometry, and `(layer, category)` tags that
/// link it to attribute records.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub geometry: PolyLine,
    pub categories: Vec<(u32, u32)>,
}

impl Feature {
    pub fn new(kind: FeatureKind, geometry: PolyLine) -> Self {
        Self {
            kind,
            geometry,
            categories: Vec::new(),
        }
    }

    pub fn point(p: Point) -> Self {
        Self::new(FeatureKind::Point, PolyLine { points: vec![p] })
    }

    pub fn centroid(p: Point) -> Self {
        Self::new(FeatureKind::Centroid, PolyLine { points: vec![p] })
    }

    pub fn line(coords: &[(f64, f64)]) -> Self {
        Self::new(FeatureKind::Line, PolyLine::from_coords(coords))
    }

    pub fn boundary(coords: &[(f64, f64)]) -> Self {
        Self::new(FeatureKind::Boundary, PolyLine::from_coords(coords))
    }

    pub fn with_category(mut self, layer: u32, category: u32) -> Self {
        if !self.categories.contains(&(layer, category)) {
            self.categories.push((layer, category));
        }
        self
    }

    /// Minimum vertex count a valid geometry of this kind must have.
    pub fn min_vertices(kind: FeatureKind) -> usize {
        if kind.is_line_like() {
            2
        } else {
            1
        }
    }
}
