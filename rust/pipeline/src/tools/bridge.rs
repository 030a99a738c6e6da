// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge removal.
//!
//! A bridge is a boundary whose removal disconnects the boundary graph into
//! two parts that each still contain a cycle: the classic connection of a
//! ring to itself or to another ring. Dangles also disconnect the graph, but
//! at least one of their sides is cycle-free, which is what tells the two
//! apart.
//!
//! Cut edges come from an iterative low-link pass; the surviving
//! 2-edge-connected components form a forest whose edges are the cut edges,
//! and a cut edge is a removable bridge exactly when both of its subtrees
//! hold a component with a cycle.

use rustc_hash::{FxHashMap, FxHashSet};
use vclean_topology::{BuildLevel, FeatureId, FeatureKind, KindMask, Map};

use crate::error::Result;
use crate::tools::merge::merge_lines;
use crate::tools::quarantine;

struct Edge {
    id: FeatureId,
    u: usize,
    v: usize,
}

/// Removes every bridge boundary, then merges the boundary chains the
/// removals left behind. Removed bridges are copied into `error_sink` when
/// one is given. Returns the number of removed bridges.
pub fn remove_bridges(map: &mut Map, mut error_sink: Option<&mut Map>) -> Result<usize> {
    map.build(BuildLevel::Base);

    let mut edges: Vec<Edge> = Vec::new();
    for id in map.ids() {
        if map.kind(id) != Some(FeatureKind::Boundary) {
            continue;
        }
        let Some(topo) = map.line_topo(id) else { continue };
        edges.push(Edge {
            id,
            u: topo.start_node as usize,
            v: topo.end_node as usize,
        });
    }
    if edges.is_empty() {
        return Ok(0);
    }

    let n = map.node_count();
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n + 1];
    for (ei, e) in edges.iter().enumerate() {
        // A closed boundary is a cycle on its own and never a cut edge.
        if e.u != e.v {
            adj[e.u].push((ei, e.v));
            adj[e.v].push((ei, e.u));
        }
    }

    let is_bridge = cut_edges(n, &adj, edges.len());

    // Collapse 2-edge-connected components and note which contain a cycle.
    let mut dsu = Dsu::new(n + 1);
    for (ei, e) in edges.iter().enumerate() {
        if e.u == e.v || !is_bridge[ei] {
            dsu.union(e.u, e.v);
        }
    }
    let mut cyclic: FxHashSet<usize> = FxHashSet::default();
    for (ei, e) in edges.iter().enumerate() {
        if e.u == e.v || !is_bridge[ei] {
            cyclic.insert(dsu.find(e.u));
        }
    }

    // The bridge forest: components joined by cut edges.
    let mut forest: FxHashMap<usize, Vec<(usize, usize)>> = FxHashMap::default();
    for (ei, e) in edges.iter().enumerate() {
        if e.u != e.v && is_bridge[ei] {
            let (cu, cv) = (dsu.find(e.u), dsu.find(e.v));
            forest.entry(cu).or_default().push((ei, cv));
            forest.entry(cv).or_default().push((ei, cu));
        }
    }

    let mut doomed: Vec<FeatureId> = Vec::new();
    let mut visited: FxHashSet<usize> = FxHashSet::default();
    let roots: Vec<usize> = forest.keys().copied().collect();
    for root in roots {
        if !visited.insert(root) {
            continue;
        }
        // Depth-first order with parents, then subtree cycle counts bottom-up.
        let mut order: Vec<(usize, usize, usize)> = Vec::new(); // (comp, parent comp, parent edge)
        let mut stack = vec![(root, usize::MAX, usize::MAX)];
        while let Some((comp, parent, pe)) = stack.pop() {
            order.push((comp, parent, pe));
            if let Some(children) = forest.get(&comp) {
                for &(ei, other) in children {
                    if visited.insert(other) {
                        stack.push((other, comp, ei));
                    }
                }
            }
        }
        // Subtree cycle counts, accumulated bottom-up in reverse DFS order.
        let mut acc: FxHashMap<usize, usize> = order
            .iter()
            .map(|&(comp, _, _)| (comp, usize::from(cyclic.contains(&comp))))
            .collect();
        for &(comp, parent, _) in order.iter().rev() {
            if parent != usize::MAX {
                let c = acc[&comp];
                *acc.entry(parent).or_insert(0) += c;
            }
        }
        let tree_total = acc[&root];
        for &(comp, parent, pe) in &order {
            if parent == usize::MAX {
                continue;
            }
            let below = acc[&comp];
            if below >= 1 && tree_total - below >= 1 {
                doomed.push(edges[pe].id);
            }
        }
    }

    let removed = doomed.len();
    for id in doomed {
        quarantine(map, &mut error_sink, id)?;
    }
    if removed > 0 {
        merge_lines(map, KindMask::BOUNDARIES)?;
    }
    Ok(removed)
}

/// Cut edges of an undirected multigraph via iterative low-link.
fn cut_edges(n: usize, adj: &[Vec<(usize, usize)>], edge_count: usize) -> Vec<bool> {
    let mut disc = vec![0u32; n + 1];
    let mut low = vec![0u32; n + 1];
    let mut bridge = vec![false; edge_count];
    let mut timer = 1u32;

    // Frames: (vertex, entering edge, next adjacency slot).
    let mut stack: Vec<(usize, usize, usize)> = Vec::new();
    for start in 1..=n {
        if disc[start] != 0 {
            continue;
        }
        disc[start] = timer;
        low[start] = timer;
        timer += 1;
        stack.push((start, usize::MAX, 0));
        while let Some(frame) = stack.last_mut() {
            let (v, pe) = (frame.0, frame.1);
            if frame.2 < adj[v].len() {
                let (ei, to) = adj[v][frame.2];
                frame.2 += 1;
                if ei == pe {
                    continue;
                }
                if disc[to] != 0 {
                    low[v] = low[v].min(disc[to]);
                } else {
                    disc[to] = timer;
                    low[to] = timer;
                    timer += 1;
                    stack.push((to, ei, 0));
                }
            } else {
                stack.pop();
                if let Some(parent) = stack.last() {
                    let pv = parent.0;
                    low[pv] = low[pv].min(low[v]);
                    if low[v] > disc[pv] {
                        bridge[pe] = true;
                    }
                }
            }
        }
    }
    bridge
}

struct Dsu {
    parent: Vec<usize>,
}

impl Dsu {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    #[test]
    fn connector_between_two_rings_is_removed() {
        let mut map = Map::new();
        map.write_feature(Feature::boundary(&[
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
            (1.0, 0.0),
        ]))
        .unwrap();
        let connector = map
            .write_feature(Feature::boundary(&[(1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::boundary(&[
            (2.0, 0.0),
            (3.0, 0.0),
            (3.0, 1.0),
            (2.0, 1.0),
            (2.0, 0.0),
        ]))
        .unwrap();

        let removed = remove_bridges(&mut map, None).unwrap();
        assert_eq!(removed, 1);
        assert!(!map.is_alive(connector));
        assert_eq!(map.count(KindMask::BOUNDARIES), 2);
    }

    #[test]
    fn dangle_is_not_a_bridge() {
        let mut map = Map::new();
        map.write_feature(Feature::boundary(&[
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
            (1.0, 0.0),
        ]))
        .unwrap();
        // A two-segment tail: each segment disconnects the graph but the far
        // side has no cycle.
        map.write_feature(Feature::boundary(&[(1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::boundary(&[(2.0, 0.0), (3.0, 0.0)]))
            .unwrap();

        assert_eq!(remove_bridges(&mut map, None).unwrap(), 0);
        assert_eq!(map.count(KindMask::BOUNDARIES), 3);
    }

    #[test]
    fn bridge_chain_is_removed_whole() {
        let mut map = Map::new();
        map.write_feature(Feature::boundary(&[
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
            (1.0, 0.0),
        ]))
        .unwrap();
        map.write_feature(Feature::boundary(&[(1.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::boundary(&[(2.0, 0.0), (3.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::boundary(&[
            (3.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (3.0, 1.0),
            (3.0, 0.0),
        ]))
        .unwrap();

        assert_eq!(remove_bridges(&mut map, None).unwrap(), 2);
        assert_eq!(map.count(KindMask::BOUNDARIES), 2);
    }
}
