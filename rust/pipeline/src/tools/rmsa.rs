// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolving zero angles between line ends at a node.
//!
//! Two ends leaving a node in exactly the same direction overlap along
//! their first segments, which breaks area tracing (the angular walk cannot
//! order them). The longer first segment is split at the tip of the shorter
//! one; the overlap then becomes a duplicated whole segment that `rmdupl`
//! removes.

use tracing::warn;
use vclean_geometry::{point_segment_distance, Point, PolyLine};
use vclean_topology::{BuildLevel, FeatureId, KindMask, LineEnd, Map, NodeId};

use crate::error::Result;

/// Splits lines so that no two scanned ends leave a node at an identical
/// angle with different first vertices. Returns the number of splits.
pub fn remove_small_angles(map: &mut Map, mask: KindMask) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    map.build(BuildLevel::Base);
    let mut modified = 0;
    loop {
        let Some((victim, at)) = find_equal_angle_pair(map, mask) else {
            return Ok(modified);
        };
        if split_line_at(map, victim, &at)? {
            modified += 1;
        } else {
            warn!(line = victim, "equal-angle overlap point not on the line, giving up");
            return Ok(modified);
        }
    }
}

/// First pair of same-angle ends whose first vertices differ, returned as
/// the line owning the longer first segment and the point to split it at.
fn find_equal_angle_pair(map: &Map, mask: KindMask) -> Option<(FeatureId, Point)> {
    for nid in 1..=map.node_count() as NodeId {
        let node = map.node(nid)?;
        if node.ends.len() < 2 {
            continue;
        }
        for i in 0..node.ends.len() {
            let j = (i + 1) % node.ends.len();
            if j == i {
                continue;
            }
            let (e1, e2) = (node.ends[i], node.ends[j]);
            if e1.angle != e2.angle {
                continue;
            }
            let in_mask = |e: &LineEnd| {
                map.kind(e.line.abs()).is_some_and(|k| mask.contains(k))
            };
            if !in_mask(&e1) || !in_mask(&e2) {
                continue;
            }
            let (Some(q1), Some(q2)) = (first_vertex(map, &e1), first_vertex(map, &e2)) else {
                continue;
            };
            if q1 == q2 {
                // The first segments coincide whole; rmdupl territory.
                continue;
            }
            let d1 = (q1 - node.point).norm();
            let d2 = (q2 - node.point).norm();
            return Some(if d1 < d2 {
                (e2.line.abs(), q1)
            } else {
                (e1.line.abs(), q2)
            });
        }
    }
    None
}

/// First geometrically distinct vertex along an end's travel direction.
fn first_vertex(map: &Map, end: &LineEnd) -> Option<Point> {
    let g = &map.feature(end.line.abs())?.geometry;
    if end.line > 0 {
        let base = g.points[0];
        g.points[1..].iter().find(|p| **p != base).copied()
    } else {
        let base = g.points[g.len() - 1];
        g.points[..g.len() - 1].iter().rev().find(|p| **p != base).copied()
    }
}

/// Splits a line at a point lying on it (vertex or segment interior).
/// Returns `false` when the point misses the line or sits on an endpoint.
fn split_line_at(map: &mut Map, id: FeatureId, q: &Point) -> Result<bool> {
    let Some(feature) = map.feature(id) else {
        return Ok(false);
    };
    let feature = feature.clone();
    let pts = &feature.geometry.points;
    let last = pts.len() - 1;

    let mut halves: Option<(Vec<Point>, Vec<Point>)> = None;
    for i in 1..last {
        if pts[i] == *q {
            halves = Some((pts[..=i].to_vec(), pts[i..].to_vec()));
            break;
        }
    }
    if halves.is_none() {
        for i in 0..last {
            if pts[i] == *q || pts[i + 1] == *q {
                continue;
            }
            let seg_len = (pts[i + 1] - pts[i]).norm();
            let (d, _) = point_segment_distance(q, &pts[i], &pts[i + 1]);
            if d <= 1e-9 * seg_len.max(1.0) {
                let mut head = pts[..=i].to_vec();
                head.push(*q);
                let mut tail = vec![*q];
                tail.extend_from_slice(&pts[i + 1..]);
                halves = Some((head, tail));
                break;
            }
        }
    }

    let Some((head, tail)) = halves else {
        return Ok(false);
    };
    map.delete_feature(id)?;
    for points in [head, tail] {
        let mut part = feature.clone();
        part.geometry = PolyLine { points };
        map.write_feature(part)?;
    }
    Ok(true)
}
