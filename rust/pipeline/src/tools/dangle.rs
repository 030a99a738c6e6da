// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dangle handling.
//!
//! A dangle is a scanned line with a free end: a node where no other scanned
//! line arrives. Removing or converting one can free the end of its
//! neighbor, so both tools iterate until a full scan changes nothing.

use vclean_topology::{BuildLevel, FeatureId, FeatureKind, KindMask, Map};

use crate::error::Result;
use crate::tools::quarantine;

/// Removes dangles no longer than `threshold` (every dangle when the
/// threshold is negative). Removed lines are copied into `error_sink` when
/// one is given. Returns the number of removed lines.
pub fn remove_dangles(
    map: &mut Map,
    mask: KindMask,
    threshold: f64,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    map.build(BuildLevel::Base);
    let mut removed = 0;
    loop {
        let victims = scan_dangles(map, mask, threshold);
        if victims.is_empty() {
            return Ok(removed);
        }
        for id in victims {
            quarantine(map, &mut error_sink, id)?;
            removed += 1;
        }
    }
}

/// Converts dangling boundaries into plain lines instead of removing them.
/// Returns the number of converted boundaries.
pub fn change_dangles(map: &mut Map, threshold: f64) -> Result<usize> {
    map.build(BuildLevel::Base);
    let mut changed = 0;
    loop {
        let victims = scan_dangles(map, KindMask::BOUNDARIES, threshold);
        if victims.is_empty() {
            return Ok(changed);
        }
        for id in victims {
            let mut feature = match map.feature(id) {
                Some(f) => f.clone(),
                None => continue,
            };
            feature.kind = FeatureKind::Line;
            map.rewrite_feature(id, feature)?;
            changed += 1;
        }
    }
}

/// One scan for dangles: scanned lines where at least one end node carries
/// no other scanned line end. Degree counts only ends of kinds in the mask,
/// so a boundary hanging among plain lines still dangles for area purposes.
fn scan_dangles(map: &Map, mask: KindMask, threshold: f64) -> Vec<FeatureId> {
    let mut victims = Vec::new();
    for id in map.ids() {
        let Some(kind) = map.kind(id) else { continue };
        if !mask.contains(kind) {
            continue;
        }
        let Some(topo) = map.line_topo(id) else { continue };
        let free_end = [topo.start_node, topo.end_node].into_iter().any(|nid| {
            map.node(nid).is_some_and(|n| {
                n.ends
                    .iter()
                    .filter(|e| {
                        map.kind(e.line.abs())
                            .is_some_and(|k| mask.contains(k))
                    })
                    .count()
                    == 1
            })
        });
        if !free_end {
            continue;
        }
        if threshold < 0.0
            || map
                .feature(id)
                .is_some_and(|f| f.geometry.length() <= threshold)
        {
            victims.push(id);
        }
    }
    victims
}
