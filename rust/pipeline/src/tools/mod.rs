// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Individual cleaning tool implementations.

use vclean_topology::{FeatureId, Map};

use crate::error::Result;

pub mod bpol;
pub mod bridge;
pub mod dangle;
pub mod duplicate;
pub mod merge;
pub mod prune;
pub mod rmarea;
pub mod rmdac;
pub mod rmline;
pub mod rmsa;
pub mod snap;

/// Deletes a feature, first copying it into the error sink when one is
/// given. Every tool that removes geometry as erroneous goes through here so
/// the sink sees the feature exactly as it was deleted.
pub(crate) fn quarantine(
    map: &mut Map,
    sink: &mut Option<&mut Map>,
    id: FeatureId,
) -> Result<()> {
    if let Some(sink) = sink.as_deref_mut() {
        if let Some(feature) = map.feature(id).cloned() {
            sink.write_feature(feature)?;
        }
    }
    map.delete_feature(id)?;
    Ok(())
}
