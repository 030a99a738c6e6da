// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small area removal.
//!
//! A small area is dissolved into the neighbor it shares the longest
//! boundary with: the shared boundaries are deleted and the neighbor's
//! face grows over the freed space on the next build. An area with no
//! positive neighbor loses its outline entirely.

use tracing::warn;
use vclean_topology::{AreaId, BuildLevel, FeatureId, KindMask, Map};

use crate::error::Result;
use crate::tools::merge::merge_lines;
use crate::tools::quarantine;

/// Dissolves areas smaller than `threshold` into their longest-shared
/// neighbor, smallest first. Deleted boundaries and centroids are copied
/// into `error_sink` when one is given. Returns the number of areas removed.
pub fn remove_small_areas(
    map: &mut Map,
    threshold: f64,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    if threshold <= 0.0 {
        return Ok(0);
    }
    let mut removed = 0;
    loop {
        map.build(BuildLevel::Centroids);
        let Some(aid) = smallest_area_under(map, threshold) else {
            break;
        };
        let area = map
            .area(aid)
            .ok_or(vclean_topology::Error::NotFound(aid))?
            .clone();

        let best = longest_shared_neighbor(map, aid, &area.cycle);
        let mut doomed: Vec<FeatureId> = area
            .cycle
            .iter()
            .filter(|&&d| {
                let other = other_side(map, aid, d);
                match best {
                    Some(neighbor) => other == Some(neighbor),
                    None => other.is_some_and(|o| o <= 0),
                }
            })
            .map(|d| d.abs())
            .collect();
        doomed.sort_unstable();
        doomed.dedup();

        if doomed.is_empty() && area.centroid == 0 {
            // Nothing deletable would change this face; bail rather than spin.
            warn!(area = aid, "small area has no removable outline, giving up");
            break;
        }
        if area.centroid > 0 {
            quarantine(map, &mut error_sink, area.centroid)?;
        }
        for id in doomed {
            quarantine(map, &mut error_sink, id)?;
        }
        removed += 1;
    }
    if removed > 0 {
        merge_lines(map, KindMask::BOUNDARIES)?;
    }
    Ok(removed)
}

fn smallest_area_under(map: &Map, threshold: f64) -> Option<AreaId> {
    let mut best: Option<(f64, AreaId)> = None;
    for aid in 1..=map.area_count() as AreaId {
        let area = map.area(aid)?;
        if area.size >= threshold {
            continue;
        }
        if best.map_or(true, |(bs, _)| area.size < bs) {
            best = Some((area.size, aid));
        }
    }
    best.map(|(_, aid)| aid)
}

/// Area on the far side of a directed cycle edge, if any.
fn other_side(map: &Map, aid: AreaId, d: i32) -> Option<AreaId> {
    let topo = map.line_topo(d.abs())?;
    let other = if d > 0 { topo.right } else { topo.left };
    if other == aid {
        None
    } else {
        Some(other)
    }
}

/// Neighboring area sharing the greatest boundary length with the cycle,
/// ties going to the smaller id.
fn longest_shared_neighbor(map: &Map, aid: AreaId, cycle: &[i32]) -> Option<AreaId> {
    let mut best: Option<(f64, AreaId)> = None;
    for &d in cycle {
        let Some(other) = other_side(map, aid, d).filter(|&o| o > 0) else {
            continue;
        };
        let Some(feature) = map.feature(d.abs()) else {
            continue;
        };
        let shared = feature.geometry.length();
        let better = best.map_or(true, |(bl, bid)| {
            shared > bl || (shared == bl && other < bid)
        });
        if better {
            best = Some((shared, other));
        }
    }
    best.map(|(_, other)| other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vclean_topology::Feature;

    fn two_cells() -> Map {
        // A 1x1 cell glued to a 3x1 cell, drawn broken at the shared edge.
        let mut map = Map::new();
        map.write_feature(Feature::boundary(&[
            (1.0, 0.0),
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
        ]))
        .unwrap();
        map.write_feature(Feature::boundary(&[
            (1.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
        ]))
        .unwrap();
        map.write_feature(Feature::boundary(&[(1.0, 1.0), (1.0, 0.0)]))
            .unwrap();
        map
    }

    #[test]
    fn small_cell_dissolves_into_neighbor() {
        let mut map = two_cells();
        assert_eq!(remove_small_areas(&mut map, 2.0, None).unwrap(), 1);

        map.build(BuildLevel::Areas);
        assert_eq!(map.area_count(), 1);
        assert_relative_eq!(map.area(1).unwrap().size, 4.0);
    }

    #[test]
    fn isolated_small_area_loses_its_outline() {
        let mut map = Map::new();
        map.write_feature(Feature::boundary(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]))
        .unwrap();
        let mut sink = Map::new();
        assert_eq!(remove_small_areas(&mut map, 2.0, Some(&mut sink)).unwrap(), 1);
        assert_eq!(map.count(KindMask::BOUNDARIES), 0);
        assert_eq!(sink.count(KindMask::BOUNDARIES), 1);
    }

    #[test]
    fn non_positive_threshold_is_a_no_op() {
        let mut map = two_cells();
        assert_eq!(remove_small_areas(&mut map, 0.0, None).unwrap(), 0);
        assert_eq!(map.count(KindMask::BOUNDARIES), 3);
    }
}
