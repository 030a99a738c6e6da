// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate line removal.

use rustc_hash::FxHashMap;
use vclean_geometry::coord_key;
use vclean_topology::{FeatureId, FeatureKind, KindMask, Map};

use crate::error::Result;
use crate::tools::quarantine;

/// Removes scanned lines whose geometry duplicates an earlier one, forwards
/// or reversed. The oldest copy survives and inherits the categories of the
/// removed ones, and the removed copies land in `error_sink` when one is
/// given. Returns the number of removed lines.
pub fn remove_duplicates(
    map: &mut Map,
    mask: KindMask,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    let ids: Vec<_> = map
        .ids()
        .filter(|&id| map.kind(id).is_some_and(|k| mask.contains(k)))
        .collect();

    let mut seen: FxHashMap<(FeatureKind, Vec<(u64, u64)>), FeatureId> = FxHashMap::default();
    let mut removed = 0;
    for id in ids {
        let Some(feature) = map.feature(id) else { continue };
        let forward: Vec<(u64, u64)> = feature.geometry.points.iter().map(coord_key).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let key = (feature.kind, forward.min(reversed));

        match seen.get(&key) {
            Some(&keeper) => {
                let categories = feature.categories.clone();
                quarantine(map, &mut error_sink, id)?;
                for (layer, cat) in categories {
                    map.add_category(keeper, layer, cat)?;
                }
                removed += 1;
            }
            None => {
                seen.insert(key, id);
            }
        }
    }
    Ok(removed)
}
