// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Staged topology building: nodes, areas and isles, attachment, categories.
//!
//! Stages are strictly ordered. Building to a level runs every missing stage
//! in order; building down tears down exactly the structures the dropped
//! levels own. Editing the map invalidates everything above `Base` (node
//! topology is maintained incrementally), so a later build call re-runs the
//! higher stages from scratch.

use rustc_hash::FxHashSet;
use tracing::warn;
use vclean_geometry::{point_in_ring, signed_area, BoundingBox, Point};

use crate::feature::FeatureKind;
use crate::map::{Area, AreaId, FeatureId, Isle, IsleId, Map, Side};
use crate::spatial::SpatialIndex;

/// How much topology a map currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildLevel {
    /// Plain feature storage, no topology.
    None,
    /// Nodes and line-end registration.
    Base,
    /// Areas and isles traced from boundary cycles.
    Areas,
    /// Isles attached to their smallest enclosing area.
    AttachIsles,
    /// Centroids attached to the area containing them.
    Centroids,
    /// Everything, plus the category index.
    All,
}

impl Map {
    /// Builds topology up or down to `target`.
    pub fn build(&mut self, target: BuildLevel) {
        if target < self.built {
            self.teardown_to(target);
            self.built = target;
            return;
        }
        while self.built < target {
            match self.built {
                BuildLevel::None => {
                    self.stage_base();
                    self.built = BuildLevel::Base;
                }
                BuildLevel::Base => {
                    self.stage_areas();
                    self.built = BuildLevel::Areas;
                }
                BuildLevel::Areas => {
                    self.reset_isle_links();
                    self.attach_isles(None);
                    self.built = BuildLevel::AttachIsles;
                }
                BuildLevel::AttachIsles => {
                    self.reset_centroid_links();
                    self.attach_centroids(None);
                    self.built = BuildLevel::Centroids;
                }
                BuildLevel::Centroids => {
                    self.stage_categories();
                    self.built = BuildLevel::All;
                }
                BuildLevel::All => break,
            }
        }
    }

    fn teardown_to(&mut self, target: BuildLevel) {
        if self.built >= BuildLevel::All && target < BuildLevel::All {
            self.category_index.clear();
        }
        if self.built >= BuildLevel::Centroids && target < BuildLevel::Centroids {
            self.reset_centroid_links();
        }
        if self.built >= BuildLevel::AttachIsles && target < BuildLevel::AttachIsles {
            self.reset_isle_links();
        }
        if self.built >= BuildLevel::Areas && target < BuildLevel::Areas {
            self.reset_regions();
        }
        if self.built >= BuildLevel::Base && target < BuildLevel::Base {
            self.nodes.clear();
            self.node_lookup.clear();
            for r in &mut self.records {
                r.topo.start_node = 0;
                r.topo.end_node = 0;
            }
        }
    }

    /// Rebuilds the node table and the spatial index, calibrating the grid
    /// cell to the mean feature box extent.
    fn stage_base(&mut self) {
        let mut sum = 0.0;
        let mut n = 0usize;
        for r in self.records.iter().filter(|r| r.alive) {
            let extent = (r.bbox.east - r.bbox.west).max(r.bbox.north - r.bbox.south);
            if extent.is_finite() && extent > 0.0 {
                sum += extent;
                n += 1;
            }
        }
        let cell = if n > 0 { sum / n as f64 } else { 1.0 };
        self.index = SpatialIndex::new(cell);
        self.nodes.clear();
        self.node_lookup.clear();

        for i in 0..self.records.len() {
            self.records[i].topo.start_node = 0;
            self.records[i].topo.end_node = 0;
            if !self.records[i].alive {
                continue;
            }
            let id = (i + 1) as FeatureId;
            let bbox = self.records[i].bbox;
            self.index.insert(id, &bbox);
            if self.records[i].feature.kind.is_line_like() {
                self.register_line(id);
            }
        }
    }

    /// Traces every boundary side that has no region yet.
    fn stage_areas(&mut self) {
        self.reset_regions();
        for id in 1..=self.last_id() {
            let r = &self.records[id as usize - 1];
            if !r.alive || r.feature.kind != FeatureKind::Boundary {
                continue;
            }
            if self.records[id as usize - 1].topo.left == 0 {
                self.build_area_on_side(id, Side::Left);
            }
            if self.records[id as usize - 1].topo.right == 0 {
                self.build_area_on_side(id, Side::Right);
            }
        }
    }

    fn stage_categories(&mut self) {
        self.category_index.clear();
        for i in 0..self.records.len() {
            if !self.records[i].alive {
                continue;
            }
            let id = (i + 1) as FeatureId;
            for &(layer, cat) in &self.records[i].feature.categories {
                self.category_index.entry((layer, cat)).or_default().push(id);
            }
        }
    }

    fn reset_regions(&mut self) {
        self.areas.clear();
        self.isles.clear();
        for r in &mut self.records {
            if !r.alive {
                continue;
            }
            match r.feature.kind {
                FeatureKind::Line | FeatureKind::Boundary => {
                    r.topo.left = 0;
                    r.topo.right = 0;
                }
                FeatureKind::Centroid => r.topo.left = 0,
                FeatureKind::Point => {}
            }
        }
    }

    fn reset_isle_links(&mut self) {
        for isle in &mut self.isles {
            isle.area = 0;
        }
        for area in &mut self.areas {
            area.isles.clear();
        }
    }

    fn reset_centroid_links(&mut self) {
        for area in &mut self.areas {
            area.centroid = 0;
        }
        for r in &mut self.records {
            if r.alive && r.feature.kind == FeatureKind::Centroid {
                r.topo.left = 0;
            }
        }
    }

    /// Traces the face on one side of a boundary and registers it as an area
    /// (positive enclosed area) or an isle (negative). Returns `+area_id`,
    /// `-isle_id`, or 0 when the side is already assigned or the cycle is
    /// degenerate.
    pub fn build_area_on_side(&mut self, line: FeatureId, side: Side) -> i32 {
        let Some(r) = self.rec(line) else { return 0 };
        if !r.alive || r.feature.kind != FeatureKind::Boundary {
            return 0;
        }
        let assigned = match side {
            Side::Left => r.topo.left,
            Side::Right => r.topo.right,
        };
        if assigned != 0 {
            return assigned;
        }

        // The region lies to the left of the travel direction: left side
        // walks the line forwards, right side backwards.
        let start = match side {
            Side::Left => line,
            Side::Right => -line,
        };
        let Some(cycle) = self.trace_cycle(start) else {
            return 0;
        };

        let ring = self.cycle_ring(&cycle);
        let size = signed_area(&ring);
        if size == 0.0 {
            warn!(line, "boundary cycle encloses no area, dropped");
            return 0;
        }

        let bbox = BoundingBox::from_points(&ring);
        let region = if size > 0.0 {
            self.areas.push(Area {
                cycle: cycle.clone(),
                size,
                bbox,
                centroid: 0,
                isles: Vec::new(),
            });
            self.areas.len() as i32
        } else {
            self.isles.push(Isle {
                cycle: cycle.clone(),
                size,
                bbox,
                area: 0,
            });
            -(self.isles.len() as i32)
        };

        for &d in &cycle {
            let topo = &mut self.records[d.unsigned_abs() as usize - 1].topo;
            if d > 0 {
                topo.left = region;
            } else {
                topo.right = region;
            }
        }
        region
    }

    /// Walks the face to the left of `start` back around to `start`.
    ///
    /// At each node the walk leaves through the end immediately clockwise of
    /// the reversed arrival direction, which keeps the traced region on the
    /// travel-left at every step. Iterative, with a step guard against
    /// inconsistent node tables.
    fn trace_cycle(&self, start: i32) -> Option<Vec<i32>> {
        let guard = 2 * self.nodes.iter().map(|n| n.ends.len()).sum::<usize>() + 2;
        let mut cycle = Vec::new();
        let mut cur = start;
        loop {
            cycle.push(cur);
            if cycle.len() > guard {
                warn!(start, "cycle walk exceeded step guard, node table inconsistent");
                return None;
            }
            let node_id = self.arrival_node(cur);
            if node_id < 1 {
                warn!(line = cur, "directed line has no arrival node");
                return None;
            }
            let node = &self.nodes[node_id as usize - 1];
            // The arrival end of `cur` is the opposite-signed entry: `-id`
            // when travelling forwards, `+id` backwards.
            let Some(idx) = node.ends.iter().position(|e| e.line == -cur) else {
                warn!(line = cur, node = node_id, "arrival end missing from node");
                return None;
            };
            let prev = if idx == 0 { node.ends.len() - 1 } else { idx - 1 };
            let next = node.ends[prev].line;
            if next == start {
                return Some(cycle);
            }
            cur = next;
        }
    }

    /// Re-runs isle attachment, for all isles or only those overlapping a
    /// window.
    pub fn attach_isles(&mut self, window: Option<&BoundingBox>) {
        for i in 0..self.isles.len() {
            if let Some(w) = window {
                if !w.overlaps(&self.isles[i].bbox) {
                    continue;
                }
            }
            let iid = (i + 1) as IsleId;
            let enclosing = self.find_enclosing_area(iid);
            let prev = self.isles[i].area;
            if prev == enclosing {
                continue;
            }
            if prev > 0 {
                // An isle moving between areas outside a rebuild means the
                // surrounding topology was not clean when it was attached.
                warn!(isle = iid, from = prev, to = enclosing, "isle re-attached");
                if let Some(a) = self.areas.get_mut(prev as usize - 1) {
                    a.isles.retain(|&x| x != iid);
                }
            }
            self.isles[i].area = enclosing;
            if enclosing > 0 {
                let a = &mut self.areas[enclosing as usize - 1];
                if !a.isles.contains(&iid) {
                    a.isles.push(iid);
                }
            }
        }
    }

    /// Smallest area strictly enclosing an isle, 0 when none.
    ///
    /// Candidate areas must contain the isle's box and must not share a
    /// boundary line with the isle: a face traced from the same boundaries
    /// is coincident with the isle, not enclosing it.
    pub fn find_enclosing_area(&self, isle: IsleId) -> AreaId {
        let Some(isle) = self.isle(isle) else { return 0 };
        let test = self.isle_test_point(isle);
        let isle_lines: FxHashSet<FeatureId> =
            isle.cycle.iter().map(|d| d.abs()).collect();

        let mut best = 0;
        let mut best_size = f64::INFINITY;
        for (i, area) in self.areas.iter().enumerate() {
            if area.size >= best_size
                || !area.bbox.contains(&isle.bbox)
                || !area.bbox.contains_point(&test)
            {
                continue;
            }
            if area.cycle.iter().any(|d| isle_lines.contains(&d.abs())) {
                continue;
            }
            let ring = self.cycle_ring(&area.cycle);
            if point_in_ring(&test, &ring) {
                best = (i + 1) as AreaId;
                best_size = area.size;
            }
        }
        best
    }

    fn isle_test_point(&self, isle: &Isle) -> Point {
        let d = isle.cycle[0];
        let pts = &self.records[d.unsigned_abs() as usize - 1]
            .feature
            .geometry
            .points;
        if d > 0 {
            pts[0]
        } else {
            pts[pts.len() - 1]
        }
    }

    /// Re-runs centroid attachment, for all centroids or only those inside a
    /// window. The first centroid (in id order) inside an area wins; later
    /// ones are flagged as duplicates with a negated link.
    pub fn attach_centroids(&mut self, window: Option<&BoundingBox>) {
        for id in 1..=self.last_id() {
            let r = &self.records[id as usize - 1];
            if !r.alive || r.feature.kind != FeatureKind::Centroid {
                continue;
            }
            let p = r.feature.geometry.points[0];
            if let Some(w) = window {
                if !w.contains_point(&p) {
                    continue;
                }
            }
            // Drop any stale claim before re-attaching.
            let old = r.topo.left;
            if old > 0 {
                if let Some(a) = self.areas.get_mut(old as usize - 1) {
                    if a.centroid == id {
                        a.centroid = 0;
                    }
                }
            }
            self.records[id as usize - 1].topo.left = 0;

            let area = self.find_area_for_point(&p);
            if area == 0 {
                continue;
            }
            let a = &mut self.areas[area as usize - 1];
            if a.centroid == 0 {
                a.centroid = id;
                self.records[id as usize - 1].topo.left = area;
            } else {
                warn!(centroid = id, area, "duplicate centroid in area");
                self.records[id as usize - 1].topo.left = -area;
            }
        }
    }

    /// Smallest area containing a point and not excluded by one of its
    /// isles, 0 when none. Requires isles to be attached.
    pub fn find_area_for_point(&self, p: &Point) -> AreaId {
        let mut best = 0;
        let mut best_size = f64::INFINITY;
        'areas: for (i, area) in self.areas.iter().enumerate() {
            if area.size >= best_size || !area.bbox.contains_point(p) {
                continue;
            }
            let ring = self.cycle_ring(&area.cycle);
            if !point_in_ring(p, &ring) {
                continue;
            }
            for &iid in &area.isles {
                let isle = &self.isles[iid as usize - 1];
                if isle.bbox.contains_point(p) {
                    let iring = self.cycle_ring(&isle.cycle);
                    if point_in_ring(p, &iring) {
                        continue 'areas;
                    }
                }
            }
            best = (i + 1) as AreaId;
            best_size = area.size;
        }
        best
    }

    /// Outer ring of an area as a closed point sequence.
    pub fn area_ring(&self, id: AreaId) -> Option<Vec<Point>> {
        self.area(id).map(|a| self.cycle_ring(&a.cycle))
    }

    /// Ring of an isle as a closed point sequence.
    pub fn isle_ring(&self, id: IsleId) -> Option<Vec<Point>> {
        self.isle(id).map(|i| self.cycle_ring(&i.cycle))
    }
}
