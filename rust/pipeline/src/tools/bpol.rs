// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Breaking imported polygon boundaries at shared vertices.
//!
//! Freshly imported polygons arrive as full rings; adjacent rings duplicate
//! their shared chain vertex by vertex. A shared chain is detected by angle
//! pairs: a vertex revisited with the same incoming/outgoing directions lies
//! inside the chain, one revisited with different directions is a junction.
//! Boundaries are split at junctions and at other rings' endpoints, after
//! which the duplicated chains are whole lines that `rmdupl` can drop.

use rustc_hash::FxHashMap;
use vclean_geometry::{coord_key, Point, PolyLine};
use vclean_topology::{KindMask, Map};

use crate::error::Result;

#[derive(Default)]
struct Mark {
    angles: Option<(f64, f64)>,
    node: bool,
}

/// Breaks boundaries at shared polygon vertices. Returns the number of
/// splits.
pub fn break_polygons(map: &mut Map, mask: KindMask) -> Result<usize> {
    let mask = mask.restrict(KindMask::BOUNDARIES);
    let ids: Vec<_> = map
        .ids()
        .filter(|&id| map.kind(id).is_some_and(|k| mask.contains(k)))
        .collect();

    let mut marks: FxHashMap<(u64, u64), Mark> = FxHashMap::default();
    for &id in &ids {
        let Some(feature) = map.feature(id) else { continue };
        let pts = &feature.geometry.points;
        for p in [&pts[0], &pts[pts.len() - 1]] {
            marks.entry(coord_key(p)).or_default().node = true;
        }
        for i in 1..pts.len() - 1 {
            let pair = angle_pair(&pts[i - 1], &pts[i], &pts[i + 1]);
            let mark = marks.entry(coord_key(&pts[i])).or_default();
            match mark.angles {
                None => mark.angles = Some(pair),
                Some(existing) if existing != pair => mark.node = true,
                Some(_) => {}
            }
        }
    }

    let mut splits = 0;
    for id in ids {
        let Some(feature) = map.feature(id) else { continue };
        let feature = feature.clone();
        let pts = &feature.geometry.points;
        let cuts: Vec<usize> = (1..pts.len() - 1)
            .filter(|&i| {
                marks
                    .get(&coord_key(&pts[i]))
                    .is_some_and(|m| m.node)
            })
            .collect();
        if cuts.is_empty() {
            continue;
        }

        let mut parts: Vec<PolyLine> = Vec::new();
        let mut start = 0;
        for &cut in &cuts {
            parts.push(PolyLine {
                points: pts[start..=cut].to_vec(),
            });
            start = cut;
        }
        parts.push(PolyLine {
            points: pts[start..].to_vec(),
        });

        splits += parts.len() - 1;
        map.delete_feature(id)?;
        for geometry in parts {
            let mut part = feature.clone();
            part.geometry = geometry;
            map.write_feature(part)?;
        }
    }
    Ok(splits)
}

/// Directions from a vertex to its two ring neighbors, order-normalized so
/// that both traversal directions of a shared chain produce the same pair.
fn angle_pair(prev: &Point, p: &Point, next: &Point) -> (f64, f64) {
    let a = (prev.y - p.y).atan2(prev.x - p.x);
    let b = (next.y - p.y).atan2(next.x - p.x);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
