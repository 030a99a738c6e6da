// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The vector map: an append-only feature arena plus the topology tables
//! built over it.
//!
//! Feature ids are 1-based and never reused; deleting a feature leaves a
//! tombstone. A directed reference to a line-like feature is the signed id:
//! `+id` travels the vertex string forwards, `-id` backwards. Node identity
//! is exact coordinate match, with zero tolerance; snapping is a separate,
//! explicit cleaning pass.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;
use vclean_geometry::{coord_key, BoundingBox, Point};

use crate::build::BuildLevel;
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureKind, KindMask};
use crate::spatial::SpatialIndex;

/// 1-based feature id. Signed values are directed line references.
pub type FeatureId = i32;
/// 1-based node id.
pub type NodeId = i32;
/// 1-based area id.
pub type AreaId = i32;
/// 1-based isle id.
pub type IsleId = i32;

/// Which side of a directed boundary a region lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Per-feature topology links. All fields are 0 when unset.
///
/// For line-like features `left`/`right` name the region on each side of the
/// forward direction: `+area_id` or `-isle_id`. For centroids `left` is
/// reused as the attachment link: `+area_id` when the centroid labels the
/// area, `-area_id` when it is a duplicate inside an already-labelled area.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTopo {
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub left: i32,
    pub right: i32,
}

/// One line end incident to a node: `+id` for a line starting here, `-id`
/// for a line ending here, with the outgoing direction angle.
#[derive(Debug, Clone, Copy)]
pub struct LineEnd {
    pub line: i32,
    pub angle: f64,
}

/// A topological node. Incident ends are kept sorted by ascending angle so
/// the area builder can walk them in rotational order.
#[derive(Debug, Clone)]
pub struct Node {
    pub point: Point,
    pub ends: SmallVec<[LineEnd; 4]>,
}

/// A face with positive enclosed area. The cycle is the closed sequence of
/// directed boundary ids tracing the outer ring counter-clockwise.
#[derive(Debug, Clone)]
pub struct Area {
    pub cycle: Vec<i32>,
    /// Enclosed area, always positive.
    pub size: f64,
    pub bbox: BoundingBox,
    /// Labelling centroid, 0 when none.
    pub centroid: FeatureId,
    pub isles: Vec<IsleId>,
}

/// A face with negative signed area: a hole, or the unbounded outside of a
/// connected boundary group.
#[derive(Debug, Clone)]
pub struct Isle {
    pub cycle: Vec<i32>,
    /// Signed area of the traced ring, always negative.
    pub size: f64,
    pub bbox: BoundingBox,
    /// Smallest area enclosing this isle, 0 when none.
    pub area: AreaId,
}

#[derive(Debug, Clone)]
pub(crate) struct FeatureRecord {
    pub feature: Feature,
    pub bbox: BoundingBox,
    pub topo: LineTopo,
    pub alive: bool,
}

/// A vector map.
#[derive(Debug)]
pub struct Map {
    pub(crate) records: Vec<FeatureRecord>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) node_lookup: FxHashMap<(u64, u64), NodeId>,
    pub(crate) areas: Vec<Area>,
    pub(crate) isles: Vec<Isle>,
    pub(crate) index: SpatialIndex,
    pub(crate) built: BuildLevel,
    pub(crate) category_index: FxHashMap<(u32, u32), Vec<FeatureId>>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            nodes: Vec::new(),
            node_lookup: FxHashMap::default(),
            areas: Vec::new(),
            isles: Vec::new(),
            index: SpatialIndex::new(1.0),
            built: BuildLevel::None,
            category_index: FxHashMap::default(),
        }
    }

    /// Appends a feature and returns its id. Ids are never reused.
    ///
    /// Invalidates every build stage above `Base`; node topology for
    /// line-like features is maintained incrementally once base topology
    /// exists.
    pub fn write_feature(&mut self, feature: Feature) -> Result<FeatureId> {
        let min = Feature::min_vertices(feature.kind);
        if feature.geometry.len() < min {
            return Err(Error::DegenerateGeometry {
                kind: feature.kind,
                got: feature.geometry.len(),
            });
        }
        Ok(self.append(feature))
    }

    /// Tombstones a feature. The id stays allocated forever.
    pub fn delete_feature(&mut self, id: FeatureId) -> Result<()> {
        match self.rec(id) {
            None => return Err(Error::NotFound(id)),
            Some(r) if !r.alive => return Err(Error::Deleted(id)),
            Some(_) => {}
        }
        self.kill(id);
        Ok(())
    }

    /// Adds a category tag to a live feature. Invalidates the category
    /// index stage.
    pub fn add_category(&mut self, id: FeatureId, layer: u32, category: u32) -> Result<()> {
        let built = self.built;
        let r = match self.rec_mut(id) {
            None => return Err(Error::NotFound(id)),
            Some(r) if !r.alive => return Err(Error::Deleted(id)),
            Some(r) => r,
        };
        if !r.feature.categories.contains(&(layer, category)) {
            r.feature.categories.push((layer, category));
            if built > BuildLevel::Centroids {
                self.built = BuildLevel::Centroids;
            }
        }
        Ok(())
    }

    /// Deletes `id` and writes `feature` under a fresh id.
    pub fn rewrite_feature(&mut self, id: FeatureId, feature: Feature) -> Result<FeatureId> {
        self.delete_feature(id)?;
        self.write_feature(feature)
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.rec(id).filter(|r| r.alive).map(|r| &r.feature)
    }

    pub fn is_alive(&self, id: FeatureId) -> bool {
        self.rec(id).is_some_and(|r| r.alive)
    }

    pub fn kind(&self, id: FeatureId) -> Option<FeatureKind> {
        self.feature(id).map(|f| f.kind)
    }

    pub fn bbox(&self, id: FeatureId) -> Option<&BoundingBox> {
        self.rec(id).filter(|r| r.alive).map(|r| &r.bbox)
    }

    pub fn line_topo(&self, id: FeatureId) -> Option<&LineTopo> {
        self.rec(id).filter(|r| r.alive).map(|r| &r.topo)
    }

    /// Highest id ever allocated; live ids are a subset of `1..=last_id()`.
    pub fn last_id(&self) -> FeatureId {
        self.records.len() as FeatureId
    }

    /// Live feature ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.alive)
            .map(|(i, _)| (i + 1) as FeatureId)
    }

    /// Number of live features with a kind in the mask.
    pub fn count(&self, mask: KindMask) -> usize {
        self.records
            .iter()
            .filter(|r| r.alive && mask.contains(r.feature.kind))
            .count()
    }

    /// Live features of a kind in the mask whose box overlaps the search
    /// box, ascending by id.
    pub fn select_by_box(&self, bbox: &BoundingBox, mask: KindMask) -> Vec<FeatureId> {
        let mut out: Vec<FeatureId> = self
            .index
            .query(bbox)
            .into_iter()
            .filter(|&id| {
                self.rec(id).is_some_and(|r| {
                    r.alive && mask.contains(r.feature.kind) && r.bbox.overlaps(bbox)
                })
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Tightest box around every live feature.
    pub fn map_bbox(&self) -> BoundingBox {
        let mut b = BoundingBox::empty();
        for r in self.records.iter().filter(|r| r.alive) {
            b.extend(&r.bbox);
        }
        b
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id < 1 {
            return None;
        }
        self.nodes.get(id as usize - 1)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node at an exact coordinate, if one exists.
    pub fn find_node(&self, p: &Point) -> Option<NodeId> {
        self.node_lookup.get(&coord_key(p)).copied()
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        if id < 1 {
            return None;
        }
        self.areas.get(id as usize - 1)
    }

    pub fn isle(&self, id: IsleId) -> Option<&Isle> {
        if id < 1 {
            return None;
        }
        self.isles.get(id as usize - 1)
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn isle_count(&self) -> usize {
        self.isles.len()
    }

    pub fn build_level(&self) -> BuildLevel {
        self.built
    }

    /// Live features carrying `(layer, category)`. Only populated at the
    /// final build stage.
    pub fn features_with_category(&self, layer: u32, category: u32) -> &[FeatureId] {
        self.category_index
            .get(&(layer, category))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // ----- internal arena plumbing -----

    pub(crate) fn rec(&self, id: FeatureId) -> Option<&FeatureRecord> {
        if id < 1 {
            return None;
        }
        self.records.get(id as usize - 1)
    }

    pub(crate) fn rec_mut(&mut self, id: FeatureId) -> Option<&mut FeatureRecord> {
        if id < 1 {
            return None;
        }
        self.records.get_mut(id as usize - 1)
    }

    /// Appends a pre-validated feature.
    pub(crate) fn append(&mut self, feature: Feature) -> FeatureId {
        let bbox = feature.geometry.bounding_box();
        let line_like = feature.kind.is_line_like();
        self.records.push(FeatureRecord {
            feature,
            bbox,
            topo: LineTopo::default(),
            alive: true,
        });
        let id = self.records.len() as FeatureId;
        self.index.insert(id, &bbox);
        if self.built >= BuildLevel::Base {
            if line_like {
                self.register_line(id);
            }
            self.built = BuildLevel::Base;
        }
        id
    }

    /// Tombstones a known-live feature.
    pub(crate) fn kill(&mut self, id: FeatureId) {
        let (bbox, line_like) = {
            let r = &self.records[id as usize - 1];
            (r.bbox, r.feature.kind.is_line_like())
        };
        self.index.remove(id, &bbox);
        if self.built >= BuildLevel::Base && line_like {
            self.detach_line(id);
        }
        let r = &mut self.records[id as usize - 1];
        r.alive = false;
        r.topo = LineTopo::default();
        if self.built > BuildLevel::Base {
            self.built = BuildLevel::Base;
        }
    }

    /// Existing node at a coordinate, or a fresh one.
    pub(crate) fn node_at(&mut self, p: Point) -> NodeId {
        let key = coord_key(&p);
        if let Some(&id) = self.node_lookup.get(&key) {
            return id;
        }
        self.nodes.push(Node {
            point: p,
            ends: SmallVec::new(),
        });
        let id = self.nodes.len() as NodeId;
        self.node_lookup.insert(key, id);
        id
    }

    /// Registers both ends of a line-like feature in the node table.
    pub(crate) fn register_line(&mut self, id: FeatureId) {
        let (first, last, start_angle, end_angle) = {
            let pts = &self.records[id as usize - 1].feature.geometry.points;
            (
                pts[0],
                pts[pts.len() - 1],
                outgoing_angle(pts, true),
                outgoing_angle(pts, false),
            )
        };
        let start_node = self.node_at(first);
        let end_node = self.node_at(last);
        insert_end(
            &mut self.nodes[start_node as usize - 1],
            LineEnd {
                line: id,
                angle: start_angle,
            },
        );
        insert_end(
            &mut self.nodes[end_node as usize - 1],
            LineEnd {
                line: -id,
                angle: end_angle,
            },
        );
        let topo = &mut self.records[id as usize - 1].topo;
        topo.start_node = start_node;
        topo.end_node = end_node;
    }

    /// Removes both ends of a line-like feature from the node table.
    pub(crate) fn detach_line(&mut self, id: FeatureId) {
        let topo = self.records[id as usize - 1].topo;
        for nid in [topo.start_node, topo.end_node] {
            if nid >= 1 {
                self.nodes[nid as usize - 1]
                    .ends
                    .retain(|e| e.line.abs() != id);
            }
        }
        let topo = &mut self.records[id as usize - 1].topo;
        topo.start_node = 0;
        topo.end_node = 0;
    }

    /// Resolves a directed line reference into its end node on arrival.
    pub(crate) fn arrival_node(&self, directed: i32) -> NodeId {
        let topo = &self.records[directed.unsigned_abs() as usize - 1].topo;
        if directed > 0 {
            topo.end_node
        } else {
            topo.start_node
        }
    }

    /// Traces the closed ring of a directed-line cycle as a point sequence.
    /// Consecutive lines share their joint node point exactly; the duplicate
    /// is dropped.
    pub(crate) fn cycle_ring(&self, cycle: &[i32]) -> Vec<Point> {
        let mut ring: Vec<Point> = Vec::new();
        for &d in cycle {
            let pts = &self.records[d.unsigned_abs() as usize - 1]
                .feature
                .geometry
                .points;
            let skip = usize::from(!ring.is_empty());
            if d > 0 {
                ring.extend(pts.iter().skip(skip));
            } else {
                ring.extend(pts.iter().rev().skip(skip));
            }
        }
        ring
    }
}

/// Keeps a node's end list sorted by ascending angle.
fn insert_end(node: &mut Node, end: LineEnd) {
    let pos = node.ends.partition_point(|e| e.angle <= end.angle);
    node.ends.insert(pos, end);
}

/// Direction angle leaving a vertex string at one of its ends, measured from
/// the first geometrically distinct vertex. Zero-length strings get 0.
fn outgoing_angle(points: &[Point], from_start: bool) -> f64 {
    let (base, rest): (&Point, Box<dyn Iterator<Item = &Point>>) = if from_start {
        (&points[0], Box::new(points[1..].iter()))
    } else {
        (
            &points[points.len() - 1],
            Box::new(points[..points.len() - 1].iter().rev()),
        )
    };
    for p in rest {
        if p != base {
            return (p.y - base.y).atan2(p.x - base.x);
        }
    }
    warn!("line end has no distinct neighbor vertex, using angle 0");
    0.0
}
