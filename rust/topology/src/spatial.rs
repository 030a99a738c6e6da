// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Uniform grid spatial index over feature bounding boxes.
//!
//! Every live feature is registered in each grid cell its bounding box
//! covers. Queries collect the cells a search box covers and return the
//! distinct feature ids found there; the caller still has to run the exact
//! box test, the grid only prunes.

use rustc_hash::{FxHashMap, FxHashSet};
use vclean_geometry::BoundingBox;

use crate::map::FeatureId;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: FxHashMap<(i64, i64), Vec<FeatureId>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            cells: FxHashMap::default(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Inclusive cell coordinate range covered by a box.
    fn cell_range(&self, b: &BoundingBox) -> ((i64, i64), (i64, i64)) {
        (self.cell_of(b.west, b.south), self.cell_of(b.east, b.north))
    }

    pub fn insert(&mut self, id: FeatureId, bbox: &BoundingBox) {
        if bbox.is_empty() {
            return;
        }
        let ((x0, y0), (x1, y1)) = self.cell_range(bbox);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    pub fn remove(&mut self, id: FeatureId, bbox: &BoundingBox) {
        if bbox.is_empty() {
            return;
        }
        let ((x0, y0), (x1, y1)) = self.cell_range(bbox);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(ids) = self.cells.get_mut(&(cx, cy)) {
                    ids.retain(|&v| v != id);
                    if ids.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
    }

    /// Distinct feature ids registered in any cell the search box covers.
    /// Falls back to scanning the occupied cells when the box would cover
    /// more cells than exist.
    pub fn query(&self, bbox: &BoundingBox) -> Vec<FeatureId> {
        if bbox.is_empty() || self.cells.is_empty() {
            return Vec::new();
        }
        let ((x0, y0), (x1, y1)) = self.cell_range(bbox);
        let span = (x1 - x0 + 1) as u128 * (y1 - y0 + 1) as u128;

        let mut seen: FxHashSet<FeatureId> = FxHashSet::default();
        let mut out = Vec::new();
        let mut take = |ids: &Vec<FeatureId>| {
            for &id in ids {
                if seen.insert(id) {
                    out.push(id);
                }
            }
        };

        if span > self.cells.len() as u128 {
            for (&(cx, cy), ids) in &self.cells {
                if cx >= x0 && cx <= x1 && cy >= y0 && cy <= y1 {
                    take(ids);
                }
            }
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(ids) = self.cells.get(&(cx, cy)) {
                        take(ids);
                    }
                }
            }
        }
        out
    }
}
