// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex pruning.

use vclean_topology::{KindMask, Map};

use crate::error::Result;

/// Simplifies scanned lines, removing vertices that displace the geometry by
/// less than `threshold`; a non-positive threshold removes only consecutive
/// duplicate vertices. Endpoints never move, so node topology is preserved.
/// Returns the total number of removed vertices.
pub fn prune_lines(map: &mut Map, mask: KindMask, threshold: f64) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    let ids: Vec<_> = map
        .ids()
        .filter(|&id| map.kind(id).is_some_and(|k| mask.contains(k)))
        .collect();

    let mut removed = 0;
    for id in ids {
        let Some(feature) = map.feature(id) else { continue };
        let mut replacement = feature.clone();
        let dropped = replacement.geometry.simplify(threshold);
        if dropped == 0 {
            continue;
        }
        removed += dropped;
        if replacement.geometry.len() < 2 {
            map.delete_feature(id)?;
        } else {
            map.rewrite_feature(id, replacement)?;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    #[test]
    fn small_wiggles_are_pruned() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[
            (0.0, 0.0),
            (1.0, 0.001),
            (2.0, -0.001),
            (3.0, 0.0),
        ]))
        .unwrap();
        assert_eq!(prune_lines(&mut map, KindMask::LINE_LIKE, 0.01).unwrap(), 2);
        let id = map.ids().next().unwrap();
        let g = &map.feature(id).unwrap().geometry;
        assert_eq!(g.len(), 2);
        assert_eq!(g.points[0].x, 0.0);
        assert_eq!(g.points[1].x, 3.0);
    }

    #[test]
    fn zero_threshold_only_removes_duplicates() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (1.0, 5.0), (1.0, 5.0), (2.0, 0.0)]))
            .unwrap();
        assert_eq!(prune_lines(&mut map, KindMask::LINE_LIKE, 0.0).unwrap(), 1);
        let id = map.ids().next().unwrap();
        assert_eq!(map.feature(id).unwrap().geometry.len(), 3);
    }
}
