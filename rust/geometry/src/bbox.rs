// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes in map (north/south/east/west) convention.
//!
//! Boxes are used everywhere as a coarse filter before exact geometric
//! tests: the spatial index stores them, the line-breaking engine prunes
//! candidate pairs with them, and the attachment stage uses full containment
//! to shortlist enclosing areas.

use crate::Point;

/// An axis-aligned bounding box. `north >= south` and `east >= west` for any
/// non-empty box; a freshly created [`BoundingBox::empty`] box is inverted
/// and absorbs the first point it is extended with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Creates an inverted (empty) box that any `expand` call will overwrite.
    pub fn empty() -> Self {
        Self {
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
        }
    }

    /// Creates a degenerate box spanning a single point.
    pub fn from_point(p: &Point) -> Self {
        Self {
            north: p.y,
            south: p.y,
            east: p.x,
            west: p.x,
        }
    }

    /// Creates the tightest box around a set of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.expand(p);
        }
        b
    }

    /// Returns `true` if the box has absorbed no points yet.
    pub fn is_empty(&self) -> bool {
        self.north < self.south || self.east < self.west
    }

    /// Grows the box to include a point.
    pub fn expand(&mut self, p: &Point) {
        if p.y > self.north {
            self.north = p.y;
        }
        if p.y < self.south {
            self.south = p.y;
        }
        if p.x > self.east {
            self.east = p.x;
        }
        if p.x < self.west {
            self.west = p.x;
        }
    }

    /// Grows the box to include another box.
    pub fn extend(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        if other.north > self.north {
            self.north = other.north;
        }
        if other.south < self.south {
            self.south = other.south;
        }
        if other.east > self.east {
            self.east = other.east;
        }
        if other.west < self.west {
            self.west = other.west;
        }
    }

    /// Returns `true` if the boxes share at least one point (touching edges
    /// and corners count as overlap).
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.is_empty() || other.is_empty())
            && self.east >= other.west
            && self.west <= other.east
            && self.north >= other.south
            && self.south <= other.north
    }

    /// Returns `true` if `other` lies fully inside this box (borders included).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        !(self.is_empty() || other.is_empty())
            && other.west >= self.west
            && other.east <= self.east
            && other.south >= self.south
            && other.north <= self.north
    }

    /// Returns `true` if the point lies inside the box (borders included).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.west && p.x <= self.east && p.y >= self.south && p.y <= self.north
    }

    /// Returns the shared region of two boxes, or `None` when disjoint.
    /// The result may be degenerate (a segment or a single point) when the
    /// boxes only touch.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.overlaps(other) {
            return None;
        }
        Some(BoundingBox {
            north: self.north.min(other.north),
            south: self.south.max(other.south),
            east: self.east.min(other.east),
            west: self.west.max(other.west),
        })
    }

    /// Returns `true` if the box spans a single point.
    pub fn is_point(&self) -> bool {
        self.north == self.south && self.east == self.west
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_absorbs_first_point() {
        let mut b = BoundingBox::empty();
        assert!(b.is_empty());
        b.expand(&Point::new(2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b, BoundingBox::from_point(&Point::new(2.0, 3.0)));
    }

    #[test]
    fn overlap_includes_touching() {
        let a = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        let b = BoundingBox::from_points(&[Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        let c = BoundingBox::from_points(&[Point::new(1.5, 1.5), Point::new(2.0, 2.0)]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn corner_touch_intersection_is_point() {
        let a = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        let b = BoundingBox::from_points(&[Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        let shared = a.intersection(&b).unwrap();
        assert!(shared.is_point());
        assert_eq!(shared.west, 1.0);
        assert_eq!(shared.south, 1.0);
    }

    #[test]
    fn containment() {
        let outer = BoundingBox::from_points(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        let inner = BoundingBox::from_points(&[Point::new(2.0, 2.0), Point::new(3.0, 3.0)]);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains_point(&Point::new(5.0, 5.0)));
        assert!(!outer.contains_point(&Point::new(11.0, 5.0)));
    }
}
