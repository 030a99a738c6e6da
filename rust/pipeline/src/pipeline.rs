// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cleaning driver: runs an ordered list of tools over a map.

use tracing::{info, warn};
use vclean_topology::{BuildLevel, KindMask, Map};

use crate::error::{PipelineError, Result};
use crate::report::{CleanReport, ToolRun};
use crate::tool::{Tool, ToolSpec};
use crate::tools;

/// Cap on combine-mode fixpoint passes. Breaking and small-angle fixing can
/// re-create each other's input, and the source gives no termination proof,
/// so the retry loop is bounded rather than trusted.
pub const MAX_COMBINE_PASSES: usize = 100;

/// Knobs for a cleaning run.
#[derive(Debug, Clone, Copy)]
pub struct CleanOptions {
    /// Chain each tool with its canonical follow-ups: break is followed by
    /// rmdupl and merge, snap and rmsa by a break/rmdupl/rmsa fixpoint loop.
    pub combine: bool,
    /// Build full topology once the run is over.
    pub rebuild: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            combine: false,
            rebuild: true,
        }
    }
}

/// Runs the tools in order over the features selected by `mask`. Geometry
/// removed as erroneous is copied into `error_sink` when one is given.
pub fn clean(
    map: &mut Map,
    specs: &[ToolSpec],
    mask: KindMask,
    options: CleanOptions,
    mut error_sink: Option<&mut Map>,
) -> Result<CleanReport> {
    if specs.is_empty() {
        return Err(PipelineError::NoTools);
    }

    let mut report = CleanReport::default();
    for spec in specs {
        map.build(spec.tool.required_level());
        run_and_record(map, *spec, mask, error_sink.as_deref_mut(), &mut report)?;
        if options.combine {
            follow_up(map, spec.tool, mask, error_sink.as_deref_mut(), &mut report)?;
        }
    }

    if options.rebuild {
        map.build(BuildLevel::All);
    }
    Ok(report)
}

/// Canonical follow-ups of a tool in combine mode. Snapping and small-angle
/// fixing expose new intersections, so their follow-up loop repeats until a
/// pass modifies nothing.
fn follow_up(
    map: &mut Map,
    tool: Tool,
    mask: KindMask,
    mut error_sink: Option<&mut Map>,
    report: &mut CleanReport,
) -> Result<()> {
    match tool {
        Tool::Break => {
            map.build(BuildLevel::Base);
            run_and_record(
                map,
                ToolSpec::new(Tool::Rmdupl, 0.0),
                mask,
                error_sink.as_deref_mut(),
                report,
            )?;
            run_and_record(map, ToolSpec::new(Tool::Merge, 0.0), mask, None, report)?;
        }
        Tool::Snap | Tool::Rmsa => loop {
            if report.passes >= MAX_COMBINE_PASSES {
                warn!(passes = report.passes, "combine loop did not settle, stopping");
                break;
            }
            report.passes += 1;
            map.build(BuildLevel::Base);
            let mut changed = 0;
            for follow in [Tool::Break, Tool::Rmdupl, Tool::Rmsa] {
                let spec = ToolSpec::new(follow, 0.0);
                changed += run_and_record(map, spec, mask, error_sink.as_deref_mut(), report)?;
            }
            if changed == 0 {
                break;
            }
        },
        _ => {}
    }
    Ok(())
}

fn run_and_record(
    map: &mut Map,
    spec: ToolSpec,
    mask: KindMask,
    error_sink: Option<&mut Map>,
    report: &mut CleanReport,
) -> Result<usize> {
    let modified = run_tool(map, &spec, mask, error_sink)?;
    info!(tool = spec.tool.name(), modified, "tool finished");
    report.runs.push(ToolRun {
        tool: spec.tool,
        threshold: spec.threshold,
        modified,
    });
    Ok(modified)
}

fn run_tool(
    map: &mut Map,
    spec: &ToolSpec,
    mask: KindMask,
    error_sink: Option<&mut Map>,
) -> Result<usize> {
    let t = spec.threshold;
    Ok(match spec.tool {
        Tool::Break => map.break_lines(mask, error_sink),
        Tool::Snap => tools::snap::snap_lines(map, mask, t, error_sink)?,
        Tool::Rmdangle => tools::dangle::remove_dangles(map, mask, t, error_sink)?,
        Tool::Chdangle => tools::dangle::change_dangles(map, t)?,
        Tool::Rmbridge => tools::bridge::remove_bridges(map, error_sink)?,
        Tool::Rmdupl => tools::duplicate::remove_duplicates(map, mask, error_sink)?,
        Tool::Rmdac => tools::rmdac::remove_duplicate_centroids(map, error_sink)?,
        Tool::Bpol => tools::bpol::break_polygons(map, mask)?,
        Tool::Prune => tools::prune::prune_lines(map, mask, t)?,
        Tool::Rmarea => tools::rmarea::remove_small_areas(map, t, error_sink)?,
        Tool::Rmsa => tools::rmsa::remove_small_angles(map, mask)?,
        Tool::Rmline => tools::rmline::remove_zero_length(map, mask, error_sink)?,
        Tool::Merge => tools::merge::merge_lines(map, mask)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_topology::Feature;

    fn x_cross() -> Map {
        let mut map = Map::new();
        map.write_feature(Feature::line(&[(0.0, 0.0), (2.0, 2.0)]))
            .unwrap();
        map.write_feature(Feature::line(&[(0.0, 2.0), (2.0, 0.0)]))
            .unwrap();
        map
    }

    #[test]
    fn empty_tool_list_is_an_error() {
        let mut map = Map::new();
        assert!(matches!(
            clean(&mut map, &[], KindMask::ALL, CleanOptions::default(), None),
            Err(PipelineError::NoTools)
        ));
    }

    #[test]
    fn combined_break_chains_rmdupl_and_merge() {
        let mut map = x_cross();
        let specs = [ToolSpec::new(Tool::Break, 0.0)];
        let options = CleanOptions {
            combine: true,
            ..CleanOptions::default()
        };
        let report = clean(&mut map, &specs, KindMask::ALL, options, None).unwrap();

        let ran: Vec<Tool> = report.runs.iter().map(|r| r.tool).collect();
        assert_eq!(ran, vec![Tool::Break, Tool::Rmdupl, Tool::Merge]);
        assert_eq!(report.total_modified(), 2);
        assert_eq!(map.count(KindMask::LINES), 4);
    }

    #[test]
    fn combined_snap_loops_to_a_fixpoint() {
        let mut map = x_cross();
        let specs = [ToolSpec::new(Tool::Snap, 0.001)];
        let options = CleanOptions {
            combine: true,
            ..CleanOptions::default()
        };
        let report = clean(&mut map, &specs, KindMask::ALL, options, None).unwrap();

        // Pass one breaks the crossing, pass two changes nothing.
        assert_eq!(report.passes, 2);
        assert!(report.passes <= MAX_COMBINE_PASSES);
        assert_eq!(map.count(KindMask::LINES), 4);
    }
}
