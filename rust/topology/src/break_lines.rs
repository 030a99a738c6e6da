// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line breaking: splitting line-like features at every mutual and self
//! intersection so that lines meet only at nodes.
//!
//! The engine walks every eligible line A, shortlists candidate partners by
//! bounding box (including A itself for self-intersections), and replaces
//! split inputs with their parts under fresh ids. New parts take their
//! parent's kind and categories and re-enter the scan, so one call reaches a
//! fixed point: afterwards no two live scanned lines cross anywhere but at
//! shared endpoints.

use rustc_hash::FxHashSet;
use vclean_geometry::{
    collapsed_loop_split, split_at_crossings, BoundingBox, Point, PolyLine,
};

use crate::feature::{Feature, KindMask};
use crate::map::{FeatureId, Map};

impl Map {
    /// Breaks every live line of a kind in `mask` at every intersection.
    /// Returns the number of splits performed. Each intersection point is
    /// written to `error_sink` as a point feature when one is given.
    pub fn break_lines(&mut self, mask: KindMask, error_sink: Option<&mut Map>) -> usize {
        self.break_lines_scoped(None, None, mask, error_sink, false)
    }

    /// Counts the splits [`Map::break_lines`] would perform without touching
    /// the map. The error sink is still written.
    pub fn check_line_breaks(&mut self, mask: KindMask, error_sink: Option<&mut Map>) -> usize {
        self.break_lines_scoped(None, None, mask, error_sink, true)
    }

    /// Scoped variant: with `break_ids`, only listed lines may be split
    /// (others act as blades); with `reference_ids`, only listed lines are
    /// scanned as A. Ids of new parts are appended to both lists so the scan
    /// covers them, and callers get the grown subsets back.
    pub fn break_lines_scoped(
        &mut self,
        mut break_ids: Option<&mut Vec<FeatureId>>,
        mut reference_ids: Option<&mut Vec<FeatureId>>,
        mask: KindMask,
        mut error_sink: Option<&mut Map>,
        dry_run: bool,
    ) -> usize {
        let mask = mask.restrict(KindMask::LINE_LIKE);
        let mut break_set: Option<FxHashSet<FeatureId>> = break_ids
            .as_ref()
            .map(|v| v.iter().copied().collect());
        let mut ref_set: Option<FxHashSet<FeatureId>> = reference_ids
            .as_ref()
            .map(|v| v.iter().copied().collect());

        let mut splits = 0usize;
        let mut pos = 0usize;

        loop {
            // The scan domain grows as parts are appended.
            let a_id = match reference_ids.as_ref() {
                Some(list) => match list.get(pos) {
                    Some(&id) => id,
                    None => break,
                },
                None => {
                    if pos >= self.records.len() {
                        break;
                    }
                    (pos + 1) as FeatureId
                }
            };
            pos += 1;

            if !self.is_alive(a_id) || !mask.contains(self.records[a_id as usize - 1].feature.kind)
            {
                continue;
            }
            let a_geom = self.records[a_id as usize - 1].feature.geometry.clone();
            let a_box = self.records[a_id as usize - 1].bbox;
            let a_touch = interior_touches(&a_geom.points, &a_box);
            let a_breakable = break_set.as_ref().map_or(true, |s| s.contains(&a_id));

            for b_id in self.select_by_box(&a_box, mask) {
                if !self.is_alive(b_id) {
                    continue;
                }
                let b_breakable = break_set.as_ref().map_or(true, |s| s.contains(&b_id));
                if !a_breakable && !b_breakable {
                    continue;
                }
                // Both eligible and the smaller id gets its own scan turn:
                // the pair was or will be evaluated there.
                if a_breakable
                    && b_breakable
                    && b_id < a_id
                    && ref_set.as_ref().map_or(true, |s| s.contains(&b_id))
                {
                    continue;
                }

                let self_pair = b_id == a_id;
                let b_geom = self.records[b_id as usize - 1].feature.geometry.clone();
                let b_box = self.records[b_id as usize - 1].bbox;

                if !self_pair {
                    let b_touch = interior_touches(&b_geom.points, &b_box);
                    if corner_touch_only(&a_geom, &a_box, &a_touch, &b_geom, &b_box, &b_touch) {
                        continue;
                    }
                }

                let res = split_at_crossings(&a_geom, &b_geom, self_pair);
                let mut a_parts = res.a_parts;
                let b_parts = res.b_parts;
                let mut crossings = res.crossings;

                // A line retracing itself exactly has no pairwise segment
                // crossing but must still be split at the turning point.
                if self_pair && crossings.is_empty() && a_breakable {
                    if let Some((parts, at)) = collapsed_loop_split(&a_geom) {
                        a_parts = parts;
                        crossings.push(at);
                    }
                }
                if crossings.is_empty() {
                    continue;
                }

                let a_cut = a_parts.len() > 1;
                let b_cut = !self_pair && b_parts.len() > 1;
                if !a_cut && !b_cut {
                    continue;
                }
                if let Some(sink) = error_sink.as_deref_mut() {
                    for p in &crossings {
                        sink.append(Feature::point(*p));
                    }
                }

                let a_split = a_breakable && a_cut;
                let b_split = b_breakable && b_cut;
                if a_split {
                    splits += a_parts.len() - 1;
                }
                if b_split {
                    splits += b_parts.len() - 1;
                }
                if dry_run {
                    continue;
                }

                if b_split {
                    self.replace_with_parts(
                        b_id,
                        b_parts,
                        &mut break_set,
                        &mut ref_set,
                        &mut break_ids,
                        &mut reference_ids,
                    );
                }
                if a_split {
                    self.replace_with_parts(
                        a_id,
                        a_parts,
                        &mut break_set,
                        &mut ref_set,
                        &mut break_ids,
                        &mut reference_ids,
                    );
                    // A is gone; its parts meet the remaining candidates when
                    // their own scan turn comes.
                    break;
                }
            }
        }
        splits
    }

    fn replace_with_parts(
        &mut self,
        id: FeatureId,
        parts: Vec<PolyLine>,
        break_set: &mut Option<FxHashSet<FeatureId>>,
        ref_set: &mut Option<FxHashSet<FeatureId>>,
        break_ids: &mut Option<&mut Vec<FeatureId>>,
        reference_ids: &mut Option<&mut Vec<FeatureId>>,
    ) {
        let template = self.records[id as usize - 1].feature.clone();
        self.kill(id);
        for geometry in parts {
            let new_id = self.append(Feature {
                kind: template.kind,
                geometry,
                categories: template.categories.clone(),
            });
            if let Some(set) = break_set.as_mut() {
                set.insert(new_id);
            }
            if let Some(set) = ref_set.as_mut() {
                set.insert(new_id);
            }
            if let Some(list) = break_ids.as_deref_mut() {
                list.push(new_id);
            }
            if let Some(list) = reference_ids.as_deref_mut() {
                list.push(new_id);
            }
        }
    }
}

/// Which sides of a line's bounding box its interior vertices touch. The
/// endpoints always touch some side; only interior contact matters for the
/// corner-overlap test.
#[derive(Debug, Default, Clone, Copy)]
struct TouchSides {
    north: bool,
    south: bool,
    east: bool,
    west: bool,
}

fn interior_touches(points: &[Point], b: &BoundingBox) -> TouchSides {
    let mut t = TouchSides::default();
    if points.len() < 3 {
        return t;
    }
    for p in &points[1..points.len() - 1] {
        t.north |= p.y == b.north;
        t.south |= p.y == b.south;
        t.east |= p.x == b.east;
        t.west |= p.x == b.west;
    }
    t
}

fn touches_at(t: &TouchSides, b: &BoundingBox, p: &Point) -> bool {
    (t.north && p.y == b.north)
        || (t.south && p.y == b.south)
        || (t.east && p.x == b.east)
        || (t.west && p.x == b.west)
}

/// True when two lines meet only at one shared endpoint and their boxes
/// overlap in nothing but that corner point: such a pair cannot produce a
/// split and is skipped without an exact intersection pass. If either line's
/// interior also reaches the corner, the pair is kept, since the other
/// line's endpoint may then touch it mid-line.
fn corner_touch_only(
    a: &PolyLine,
    a_box: &BoundingBox,
    a_touch: &TouchSides,
    b: &PolyLine,
    b_box: &BoundingBox,
    b_touch: &TouchSides,
) -> bool {
    let Some(shared) = single_shared_endpoint(a, b) else {
        return false;
    };
    let Some(overlap) = a_box.intersection(b_box) else {
        return true;
    };
    if !overlap.is_point() {
        return false;
    }
    let corner = Point::new(overlap.west, overlap.south);
    if corner != shared {
        return false;
    }
    !(touches_at(a_touch, a_box, &corner) || touches_at(b_touch, b_box, &corner))
}

fn single_shared_endpoint(a: &PolyLine, b: &PolyLine) -> Option<Point> {
    let a_ends = [a.points[0], a.points[a.points.len() - 1]];
    let b_ends = [b.points[0], b.points[b.points.len() - 1]];
    let mut shared: Option<Point> = None;
    for p in &a_ends {
        for q in &b_ends {
            if p == q {
                match shared {
                    None => shared = Some(*p),
                    Some(s) if s == *p => {}
                    Some(_) => return None,
                }
            }
        }
    }
    shared
}
