// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joining lines at pass-through nodes.
//!
//! Other tools leave chains behind: removing a bridge or merging areas turns
//! former junctions into nodes with exactly two line ends. Merging welds
//! such pairs back into one line when kind and categories agree.

use vclean_topology::{BuildLevel, KindMask, Map, NodeId};

use crate::error::Result;

/// Merges pairs of scanned lines meeting at a node of degree two. Returns
/// the number of joins.
pub fn merge_lines(map: &mut Map, mask: KindMask) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    map.build(BuildLevel::Base);
    let mut merged = 0;
    loop {
        let Some((d1, d2)) = find_joinable(map, mask) else {
            return Ok(merged);
        };
        // Orient the first line to end at the node and the second to start
        // there, then weld. An end entry `+id` starts at the node, `-id`
        // ends there.
        let first = map.feature(d1.abs()).map(|f| f.clone());
        let second = map.feature(d2.abs()).map(|f| f.clone());
        let (Some(first), Some(second)) = (first, second) else {
            return Ok(merged);
        };
        let mut geometry = first.geometry.clone();
        if d1 > 0 {
            geometry.reverse();
        }
        let mut tail = second.geometry.clone();
        if d2 < 0 {
            tail.reverse();
        }
        geometry.points.extend(tail.points.into_iter().skip(1));

        let mut joined = first;
        joined.geometry = geometry;
        map.delete_feature(d1.abs())?;
        map.delete_feature(d2.abs())?;
        map.write_feature(joined)?;
        merged += 1;
    }
}

/// First node with exactly two compatible line ends, as directed entries.
fn find_joinable(map: &Map, mask: KindMask) -> Option<(i32, i32)> {
    for nid in 1..=map.node_count() as NodeId {
        let node = map.node(nid)?;
        if node.ends.len() != 2 {
            continue;
        }
        let (e1, e2) = (node.ends[0].line, node.ends[1].line);
        if e1.abs() == e2.abs() {
            continue; // a closed loop, nothing to join
        }
        let (Some(f1), Some(f2)) = (map.feature(e1.abs()), map.feature(e2.abs())) else {
            continue;
        };
        if f1.kind != f2.kind || !mask.contains(f1.kind) {
            continue;
        }
        let mut c1 = f1.categories.clone();
        let mut c2 = f2.categories.clone();
        c1.sort_unstable();
        c2.sort_unstable();
        if c1 != c2 {
            continue;
        }
        return Some((e1, e2));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    #[test]
    fn chain_collapses_to_one_line() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (1.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(2.0, 0.0), (3.0, 0.0)]))
            .unwrap();

        assert_eq!(merge_lines(&mut map, KindMask::LINES).unwrap(), 2);
        assert_eq!(map.count(KindMask::LINES), 1);
        let id = map.ids().next().unwrap();
        assert_eq!(map.feature(id).unwrap().geometry.length(), 3.0);
    }

    #[test]
    fn junction_blocks_merging() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (1.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(1.0, 0.0), (1.0, 1.0)]))
            .unwrap();

        assert_eq!(merge_lines(&mut map, KindMask::LINES).unwrap(), 0);
    }

    #[test]
    fn different_categories_block_merging() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (1.0, 0.0)]).with_category(1, 1))
            .unwrap();
        map.write_feature(Feature::line(&[(1.0, 0.0), (2.0, 0.0)]).with_category(1, 2))
            .unwrap();

        assert_eq!(merge_lines(&mut map, KindMask::LINES).unwrap(), 0);
        assert_eq!(map.count(KindMask::LINES), 2);
    }
}
