// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signed polygon area and point containment.
//!
//! The sign of the shoelace area is what classifies a traced boundary cycle:
//! positive (counter-clockwise) cycles enclose areas, negative ones enclose
//! isles (holes), and exact zero is a degenerate cycle the builder drops.

use crate::Point;

/// Signed area of a ring by the shoelace formula. Positive for
/// counter-clockwise winding. The ring may be explicitly closed (first ==
/// last) or not; the wrap edge is included either way.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let n = ring.len();
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Even-odd (ray casting) point-in-polygon test against a ring.
///
/// Points exactly on the ring are not reliably classified; callers test
/// points known to lie strictly inside or outside (isle nodes against an
/// enclosing area's outer ring, centroids against candidate rings).
pub fn point_in_ring(p: &Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn ccw_square_is_positive() {
        assert_relative_eq!(signed_area(&square(2.0)), 4.0);
    }

    #[test]
    fn cw_square_is_negative() {
        let mut ring = square(2.0);
        ring.reverse();
        assert_relative_eq!(signed_area(&ring), -4.0);
    }

    #[test]
    fn degenerate_ring_is_zero() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        assert_relative_eq!(signed_area(&ring), 0.0);
    }

    #[test]
    fn closed_ring_matches_open_ring() {
        let mut closed = square(3.0);
        closed.push(closed[0]);
        assert_relative_eq!(signed_area(&closed), signed_area(&square(3.0)));
    }

    #[test]
    fn point_in_ring_basic() {
        let ring = square(10.0);
        assert!(point_in_ring(&Point::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(&Point::new(15.0, 5.0), &ring));
        assert!(!point_in_ring(&Point::new(-1.0, -1.0), &ring));
    }

    #[test]
    fn point_in_concave_ring() {
        // A "U" shape; the notch is outside.
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 6.0),
            Point::new(0.0, 6.0),
        ];
        assert!(point_in_ring(&Point::new(1.0, 1.0), &ring));
        assert!(point_in_ring(&Point::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(&Point::new(3.0, 5.0), &ring));
    }
}
