// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered vertex strings and the point/segment primitives built on them.

use crate::bbox::BoundingBox;
use crate::Point;

/// An ordered sequence of 2D vertices. The geometry payload of every map
/// feature: a point feature stores one vertex, line-like features two or
/// more.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyLine {
    pub points: Vec<Point>,
}

impl PolyLine {
    /// Creates an empty vertex string.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a vertex string from `(x, y)` pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the string has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of segments (`len - 1`, saturating).
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn first_point(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Returns `true` if first and last vertex coincide exactly.
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }

    /// Total Euclidean length.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Tightest bounding box around the vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Reverses the vertex order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Returns a reversed copy.
    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.reverse();
        out
    }

    /// Removes consecutive duplicate vertices. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.points.len();
        self.points.dedup();
        before - self.points.len()
    }

    /// Removes vertices whose removal displaces the line by less than
    /// `threshold` (Douglas–Peucker, endpoints always kept). A zero or
    /// negative threshold only removes consecutive duplicates. Returns how
    /// many vertices were removed.
    pub fn simplify(&mut self, threshold: f64) -> usize {
        let removed = self.prune();
        if threshold <= 0.0 || self.points.len() < 3 {
            return removed;
        }

        let n = self.points.len();
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        // Explicit stack instead of recursion: pathological vertex counts
        // must not overflow the call stack.
        let mut stack = vec![(0usize, n - 1)];
        while let Some((lo, hi)) = stack.pop() {
            if hi <= lo + 1 {
                continue;
            }
            let mut worst = 0.0;
            let mut worst_idx = lo;
            for i in (lo + 1)..hi {
                let (d, _) =
                    point_segment_distance(&self.points[i], &self.points[lo], &self.points[hi]);
                if d > worst {
                    worst = d;
                    worst_idx = i;
                }
            }
            if worst > threshold {
                keep[worst_idx] = true;
                stack.push((lo, worst_idx));
                stack.push((worst_idx, hi));
            }
        }

        let before = self.points.len();
        let mut idx = 0;
        self.points.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        removed + (before - self.points.len())
    }
}

/// Distance from a point to a segment, with the closest point on the segment.
pub fn point_segment_distance(p: &Point, a: &Point, b: &Point) -> (f64, Point) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return ((p - a).norm(), *a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    // Exact endpoints when the projection clamps, to preserve coordinate
    // identity.
    let closest = if t == 0.0 {
        *a
    } else if t == 1.0 {
        *b
    } else {
        a + ab * t
    };
    ((p - closest).norm(), closest)
}

/// Hashable identity key for a coordinate: the raw bit patterns, with
/// negative zero normalized. Node identity is exact coordinate match, so
/// two points compare equal iff their keys do.
pub fn coord_key(p: &Point) -> (u64, u64) {
    let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v }.to_bits();
    (norm(p.x), norm(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn length_and_closed() {
        let line = PolyLine::from_coords(&[(0.0, 0.0), (3.0, 4.0), (0.0, 0.0)]);
        assert_relative_eq!(line.length(), 10.0);
        assert!(line.is_closed());
        assert!(!PolyLine::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).is_closed());
    }

    #[test]
    fn prune_removes_consecutive_duplicates() {
        let mut line =
            PolyLine::from_coords(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(line.prune(), 2);
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn simplify_keeps_significant_vertices() {
        // Middle vertex deviates by 1.0, the others by ~0.001
        let mut line = PolyLine::from_coords(&[
            (0.0, 0.0),
            (1.0, 0.001),
            (2.0, 1.0),
            (3.0, -0.001),
            (4.0, 0.0),
        ]);
        line.simplify(0.01);
        assert_eq!(line.len(), 3);
        assert_eq!(line.points[1], Point::new(2.0, 1.0));
    }

    #[test]
    fn simplify_zero_threshold_only_dedups() {
        let mut line = PolyLine::from_coords(&[(0.0, 0.0), (1.0, 0.5), (1.0, 0.5), (2.0, 0.0)]);
        assert_eq!(line.simplify(0.0), 1);
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let (d, c) = point_segment_distance(&Point::new(-3.0, 4.0), &a, &b);
        assert_relative_eq!(d, 5.0);
        assert_eq!(c, a);
        let (d, c) = point_segment_distance(&Point::new(5.0, 2.0), &a, &b);
        assert_relative_eq!(d, 2.0);
        assert_eq!(c, Point::new(5.0, 0.0));
    }

    #[test]
    fn coord_key_normalizes_negative_zero() {
        assert_eq!(
            coord_key(&Point::new(-0.0, 1.0)),
            coord_key(&Point::new(0.0, 1.0))
        );
    }
}
