// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment/segment and polyline/polyline intersection.
//!
//! [`segment_crossing`] is the exact primitive: a single crossing point, a
//! collinear overlap interval, or nothing. [`split_at_crossings`] lifts it to
//! whole polylines and returns each input split at every intersection point,
//! which is what the line-breaking engine consumes.
//!
//! Intersection points that fall on a segment endpoint are returned
//! bit-for-bit equal to that endpoint. Downstream node identity is exact
//! coordinate match, so any drift here would silently disconnect the planar
//! graph.

use crate::polyline::{coord_key, PolyLine};
use crate::{Point, Vector};
use std::collections::HashSet;

/// Relative tolerance for the parallelism / collinearity tests.
const PARALLEL_EPS: f64 = 1e-12;
/// Slack on segment parameters before clamping to `[0, 1]`.
const PARAM_EPS: f64 = 1e-9;

/// Result of intersecting two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentCrossing {
    /// The segments do not meet.
    None,
    /// The segments meet in a single point.
    Point(Point),
    /// The segments are collinear and share an interval.
    Overlap(Point, Point),
}

fn cross(a: &Vector, b: &Vector) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Intersects segment `a0→a1` with segment `b0→b1`.
pub fn segment_crossing(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> SegmentCrossing {
    let r = a1 - a0;
    let s = b1 - b0;
    let r_len = r.norm();
    let s_len = s.norm();

    // Degenerate segments: fall back to point-on-segment tests.
    if r_len == 0.0 && s_len == 0.0 {
        return if a0 == b0 {
            SegmentCrossing::Point(*a0)
        } else {
            SegmentCrossing::None
        };
    }
    if r_len == 0.0 {
        return point_on_segment(a0, b0, b1);
    }
    if s_len == 0.0 {
        return point_on_segment(b0, a0, a1);
    }

    let qp = b0 - a0;
    let denom = cross(&r, &s);

    if denom.abs() > PARALLEL_EPS * r_len * s_len {
        let t = cross(&qp, &s) / denom;
        let u = cross(&qp, &r) / denom;
        if !(-PARAM_EPS..=1.0 + PARAM_EPS).contains(&t)
            || !(-PARAM_EPS..=1.0 + PARAM_EPS).contains(&u)
        {
            return SegmentCrossing::None;
        }
        // Snap to whichever endpoint the parameters land on; otherwise
        // evaluate on segment a.
        let p = if t <= PARAM_EPS {
            *a0
        } else if t >= 1.0 - PARAM_EPS {
            *a1
        } else if u <= PARAM_EPS {
            *b0
        } else if u >= 1.0 - PARAM_EPS {
            *b1
        } else {
            a0 + r * t
        };
        return SegmentCrossing::Point(p);
    }

    // Parallel. Collinear only if b0 lies on the line through a.
    let qp_len = qp.norm();
    if cross(&qp, &r).abs() > PARALLEL_EPS * r_len * qp_len.max(r_len) {
        return SegmentCrossing::None;
    }

    // Project b's endpoints onto a's parameter space.
    let rr = r.norm_squared();
    let t0 = qp.dot(&r) / rr;
    let t1 = (b1 - a0).dot(&r) / rr;
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    let lo_c = lo.max(0.0);
    let hi_c = hi.min(1.0);
    if hi_c < lo_c - PARAM_EPS {
        return SegmentCrossing::None;
    }

    let at = |t: f64| -> Point {
        if t <= PARAM_EPS {
            *a0
        } else if t >= 1.0 - PARAM_EPS {
            *a1
        } else if (t - t0).abs() <= PARAM_EPS {
            *b0
        } else if (t - t1).abs() <= PARAM_EPS {
            *b1
        } else {
            a0 + r * t
        }
    };

    let p_lo = at(lo_c);
    let p_hi = at(hi_c);
    if p_lo == p_hi {
        SegmentCrossing::Point(p_lo)
    } else {
        SegmentCrossing::Overlap(p_lo, p_hi)
    }
}

fn point_on_segment(p: &Point, a: &Point, b: &Point) -> SegmentCrossing {
    let (d, _) = crate::polyline::point_segment_distance(p, a, b);
    if d <= PARAM_EPS * (b - a).norm().max(1.0) {
        SegmentCrossing::Point(*p)
    } else {
        SegmentCrossing::None
    }
}

/// Both polylines of a pair, each split at every mutual intersection point.
///
/// An empty parts list means "no cut touched this input"; a single-element
/// list means every cut fell on an existing endpoint (nothing to replace);
/// two or more parts mean the input was actually split.
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    pub a_parts: Vec<PolyLine>,
    pub b_parts: Vec<PolyLine>,
    /// Every distinct intersection point of the pair.
    pub crossings: Vec<Point>,
}

/// A cut on a polyline: segment index, parameter along that segment, point.
type Cut = (usize, f64, Point);

/// Computes every intersection between `a` and `b` and splits both at the
/// intersection points. With `self_test` set, `b` is ignored and `a` is
/// tested against itself, skipping adjacent segment pairs (which always
/// share a vertex) and, for closed lines, the first/last wrap pair.
pub fn split_at_crossings(a: &PolyLine, b: &PolyLine, self_test: bool) -> SplitResult {
    let mut cuts_a: Vec<Cut> = Vec::new();
    let mut cuts_b: Vec<Cut> = Vec::new();
    let mut crossing_keys: HashSet<(u64, u64)> = HashSet::new();
    let mut crossings: Vec<Point> = Vec::new();

    let na = a.segment_count();
    let closed = a.is_closed();

    let mut record = |p: Point,
                      seg_a: usize,
                      seg_b: usize,
                      cuts_a: &mut Vec<Cut>,
                      cuts_b: &mut Vec<Cut>,
                      a: &PolyLine,
                      b: &PolyLine,
                      self_test: bool| {
        cuts_a.push((seg_a, segment_param(&p, &a.points[seg_a], &a.points[seg_a + 1]), p));
        if self_test {
            cuts_a.push((seg_b, segment_param(&p, &a.points[seg_b], &a.points[seg_b + 1]), p));
        } else {
            cuts_b.push((seg_b, segment_param(&p, &b.points[seg_b], &b.points[seg_b + 1]), p));
        }
    };

    let pairs = |i: usize| -> std::ops::Range<usize> {
        if self_test {
            // Adjacent segments share a vertex by construction; testing them
            // would report that vertex on every pair.
            (i + 2)..na
        } else {
            0..b.segment_count()
        }
    };

    for i in 0..na {
        for j in pairs(i) {
            if self_test && closed && i == 0 && j == na - 1 {
                continue;
            }
            let (b0, b1) = if self_test {
                (&a.points[j], &a.points[j + 1])
            } else {
                (&b.points[j], &b.points[j + 1])
            };
            match segment_crossing(&a.points[i], &a.points[i + 1], b0, b1) {
                SegmentCrossing::None => {}
                SegmentCrossing::Point(p) => {
                    record(p, i, j, &mut cuts_a, &mut cuts_b, a, b, self_test);
                    if crossing_keys.insert(coord_key(&p)) {
                        crossings.push(p);
                    }
                }
                SegmentCrossing::Overlap(p, q) => {
                    for pt in [p, q] {
                        record(pt, i, j, &mut cuts_a, &mut cuts_b, a, b, self_test);
                        if crossing_keys.insert(coord_key(&pt)) {
                            crossings.push(pt);
                        }
                    }
                }
            }
        }
    }

    SplitResult {
        a_parts: assemble(a, cuts_a),
        b_parts: if self_test {
            Vec::new()
        } else {
            assemble(b, cuts_b)
        },
        crossings,
    }
}

fn segment_param(p: &Point, s0: &Point, s1: &Point) -> f64 {
    let dir = s1 - s0;
    let len_sq = dir.norm_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    ((p - s0).dot(&dir) / len_sq).clamp(0.0, 1.0)
}

/// Reassembles a polyline into parts separated at the given cuts. Degenerate
/// (zero-length) residue is pruned, not reported.
fn assemble(line: &PolyLine, mut cuts: Vec<Cut>) -> Vec<PolyLine> {
    if cuts.is_empty() {
        return Vec::new();
    }
    cuts.sort_by(|x, y| {
        x.0.cmp(&y.0)
            .then(x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut parts: Vec<Vec<Point>> = Vec::new();
    let mut cur: Vec<Point> = vec![line.points[0]];
    let mut ci = 0;

    for seg in 0..line.segment_count() {
        while ci < cuts.len() && cuts[ci].0 == seg {
            let p = cuts[ci].2;
            ci += 1;
            if cur.last() == Some(&p) {
                // Cut exactly at the current position: close the running
                // part if it is real, never emit an empty one.
                if cur.len() >= 2 {
                    parts.push(std::mem::replace(&mut cur, vec![p]));
                }
                continue;
            }
            cur.push(p);
            parts.push(std::mem::replace(&mut cur, vec![p]));
        }
        let end = line.points[seg + 1];
        if cur.last() != Some(&end) {
            cur.push(end);
        }
    }
    if cur.len() >= 2 {
        parts.push(cur);
    }

    parts
        .into_iter()
        .filter_map(|points| {
            let mut pl = PolyLine { points };
            pl.prune();
            (pl.len() >= 2).then_some(pl)
        })
        .collect()
}

/// Detects the collapsed-loop degeneracy: an odd-length path whose
/// coordinates read the same forwards and backwards (the line goes out and
/// retraces itself exactly). Such a line has no pairwise segment crossing
/// yet must still be split at the turning point. Returns the two halves and
/// the split point.
pub fn collapsed_loop_split(line: &PolyLine) -> Option<(Vec<PolyLine>, Point)> {
    let n = line.len();
    if n < 3 || n % 2 == 0 {
        return None;
    }
    let palindrome = (0..n / 2).all(|k| line.points[k] == line.points[n - 1 - k]);
    if !palindrome {
        return None;
    }
    let mid = n / 2;
    let first = PolyLine {
        points: line.points[..=mid].to_vec(),
    };
    let second = PolyLine {
        points: line.points[mid..].to_vec(),
    };
    Some((vec![first, second], line.points[mid]))
}
