// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate centroid removal.

use vclean_topology::{BuildLevel, FeatureKind, Map};

use crate::error::Result;
use crate::tools::quarantine;

/// Removes centroids flagged as duplicates by attachment: every area keeps
/// the centroid that claimed it first. Removed centroids are copied into
/// `error_sink` when one is given. Returns the number removed.
pub fn remove_duplicate_centroids(
    map: &mut Map,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    map.build(BuildLevel::Centroids);
    let victims: Vec<_> = map
        .ids()
        .filter(|&id| {
            map.kind(id) == Some(FeatureKind::Centroid)
                && map.line_topo(id).is_some_and(|t| t.left < 0)
        })
        .collect();
    let removed = victims.len();
    for id in victims {
        quarantine(map, &mut error_sink, id)?;
    }
    Ok(removed)
}
