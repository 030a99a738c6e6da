// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zero-length line removal.

use vclean_topology::{KindMask, Map};

use crate::error::Result;
use crate::tools::quarantine;

/// Removes scanned lines whose total length is exactly zero (all vertices
/// coincide), copying them into `error_sink` when one is given. Returns the
/// number removed.
pub fn remove_zero_length(
    map: &mut Map,
    mask: KindMask,
    mut error_sink: Option<&mut Map>,
) -> Result<usize> {
    let mask = mask.restrict(KindMask::LINE_LIKE);
    let victims: Vec<_> = map
        .ids()
        .filter(|&id| {
            map.kind(id).is_some_and(|k| mask.contains(k))
                && map.feature(id).is_some_and(|f| f.geometry.length() == 0.0)
        })
        .collect();
    let removed = victims.len();
    for id in victims {
        quarantine(map, &mut error_sink, id)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    #[test]
    fn zero_length_lines_go_away() {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(1.0, 1.0), (1.0, 1.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(0.0, 0.0), (2.0, 0.0)]))
            .unwrap();
        map.write_feature(Feature::boundary(&[(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)]))
            .unwrap();

        assert_eq!(
            remove_zero_length(&mut map, KindMask::LINE_LIKE, None).unwrap(),
            2
        );
        assert_eq!(map.count(KindMask::LINE_LIKE), 1);
        assert!(map.is_alive(2));
    }
}
