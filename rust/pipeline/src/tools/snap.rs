// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex snapping.
//!
//! Anchors are chosen greedily from line endpoints in id order: an endpoint
//! becomes an anchor unless an earlier anchor lies within the threshold.
//! Every vertex of every scanned line is then moved onto the nearest anchor
//! in range. Snapping is the only place coordinates move; everything else in
//! the pipeline works with exact coordinates.

use rustc_hash::FxHashMap;
use vclean_geometry::Point;
use vclean_topology::{KindMask, Map};

use crate::error::Result;
use crate::tools::quarantine;

/// Snaps vertices of scanned lines to anchor endpoints within `threshold`.
/// Returns the number of modified lines. Lines collapsing to a single
/// distinct vertex are removed and copied into `error_sink` when one is
/// given.
pub fn snap_lines(
    map: &mut Map,
    mask: KindMask,
    threshold: f64,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    if threshold <= 0.0 {
        return Ok(0);
    }

    let ids: Vec<_> = map
        .ids()
        .filter(|&id| map.kind(id).is_some_and(|k| mask.contains(k)))
        .collect();

    let mut anchors = AnchorGrid::new(threshold);
    for &id in &ids {
        let g = &map.feature(id).ok_or(vclean_topology::Error::NotFound(id))?.geometry;
        for p in [g.points[0], g.points[g.len() - 1]] {
            if anchors.nearest(&p).is_none() {
                anchors.insert(p);
            }
        }
    }

    let mut modified = 0;
    for id in ids {
        let feature = match map.feature(id) {
            Some(f) => f.clone(),
            None => continue,
        };
        let mut geometry = feature.geometry.clone();
        let mut moved = false;
        for p in &mut geometry.points {
            if let Some(anchor) = anchors.nearest(p) {
                if anchor != *p {
                    *p = anchor;
                    moved = true;
                }
            }
        }
        if !moved {
            continue;
        }
        geometry.prune();
        if geometry.len() < 2 {
            quarantine(map, &mut error_sink, id)?;
        } else {
            let mut replacement = feature;
            replacement.geometry = geometry;
            map.rewrite_feature(id, replacement)?;
        }
        modified += 1;
    }
    Ok(modified)
}

/// Grid hash over anchor points, cell size equal to the snap threshold so a
/// 3x3 neighborhood covers every candidate.
struct AnchorGrid {
    threshold: f64,
    points: Vec<Point>,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
}

impl AnchorGrid {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            points: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    fn cell(&self, p: &Point) -> (i64, i64) {
        (
            (p.x / self.threshold).floor() as i64,
            (p.y / self.threshold).floor() as i64,
        )
    }

    fn insert(&mut self, p: Point) {
        let cell = self.cell(&p);
        self.points.push(p);
        self.cells.entry(cell).or_default().push(self.points.len() - 1);
    }

    /// Nearest anchor within the threshold, ties to the earliest anchor.
    fn nearest(&self, p: &Point) -> Option<Point> {
        let (cx, cy) = self.cell(p);
        let mut best: Option<(f64, usize)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &i in ids {
                    let d = (self.points[i] - p).norm();
                    if d <= self.threshold
                        && best.map_or(true, |(bd, bi)| d < bd || (d == bd && i < bi))
                    {
                        best = Some((d, i));
                    }
                }
            }
        }
        best.map(|(_, i)| self.points[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    #[test]
    fn close_endpoints_snap_together() {
        let mut map = Map::new();
        let a = map
            .write_feature(Feature::line(&[(0.0, 0.0), (10.0, 0.0)]))
            .unwrap();
        let b = map
            .write_feature(Feature::line(&[(10.05, 0.01), (20.0, 0.0)]))
            .unwrap();
        let modified = snap_lines(&mut map, KindMask::LINE_LIKE, 0.1, None).unwrap();
        assert_eq!(modified, 1);
        assert!(map.is_alive(a));
        assert!(!map.is_alive(b));
        // The rewritten line now starts exactly on a's endpoint.
        let snapped = map.ids().max().unwrap();
        assert_eq!(
            map.feature(snapped).unwrap().geometry.points[0],
            Point::new(10.0, 0.0)
        );
    }

    #[test]
    fn far_endpoints_are_left_alone() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (10.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(10.5, 0.0), (20.0, 0.0)]))
            .unwrap();
        assert_eq!(snap_lines(&mut map, KindMask::LINE_LIKE, 0.1, None).unwrap(), 0);
    }

    #[test]
    fn collapsing_line_is_removed() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (10.0, 0.0)]))
            .unwrap();
        let tiny = map
            .write_feature(Feature::line(&[(10.0, 0.0), (10.04, 0.0)]))
            .unwrap();
        let mut sink = Map::new();
        let modified = snap_lines(&mut map, KindMask::LINE_LIKE, 0.1, Some(&mut sink)).unwrap();
        assert_eq!(modified, 1);
        assert!(!map.is_alive(tiny));
        assert_eq!(map.count(KindMask::LINE_LIKE), 1);
        // The collapsed line is preserved in the sink as drawn.
        assert_eq!(sink.count(KindMask::LINES), 1);
        assert_eq!(sink.feature(1).unwrap().geometry.len(), 2);
    }
}
