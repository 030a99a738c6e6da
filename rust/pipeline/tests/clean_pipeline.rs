// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end cleaning runs over deliberately messy maps.

use approx::assert_relative_eq;
use vclean_pipeline::{clean, CleanOptions, CleanReport, Tool, ToolSpec};
use vclean_topology::{BuildLevel, Feature, FeatureKind, KindMask, Map};

fn messy_lines() -> Map {
    let mut map = Map::new();
    // Two crossing lines, a duplicate, a short dangle, a degenerate line.
    map.write_feature(Feature::line(&[(0.0, 0.0), (4.0, 0.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(2.0, -2.0), (2.0, 2.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(0.0, 0.0), (4.0, 0.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(0.0, 0.0), (0.0, 1.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(5.0, 5.0), (5.0, 5.0)]))
        .unwrap();
    map
}

#[test]
fn standard_sequence_repairs_a_messy_map() {
    let mut map = messy_lines();
    let specs = ToolSpec::parse_list("break,rmdupl,rmline,rmdangle", "0,0,0,1.5").unwrap();
    let report = clean(
        &mut map,
        &specs,
        KindMask::ALL,
        CleanOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(report.runs.len(), 4);
    // break splits both crossing lines and the duplicate; rmdupl drops the
    // two duplicated halves; rmline the degenerate line; rmdangle the stub.
    assert_eq!(report.runs[0].modified, 3);
    assert_eq!(report.runs[1].modified, 2);
    assert_eq!(report.runs[2].modified, 1);
    assert_eq!(report.runs[3].modified, 1);

    assert_eq!(map.count(KindMask::LINES), 4);
    map.build(BuildLevel::Base);
    let occupied = (1..=map.node_count() as i32)
        .filter(|&n| !map.node(n).unwrap().ends.is_empty())
        .count();
    assert_eq!(occupied, 5);
    let center = map.find_node(&vclean_geometry::Point::new(2.0, 0.0)).unwrap();
    assert_eq!(map.node(center).unwrap().ends.len(), 4);
}

#[test]
fn polygon_import_cleanup_merges_small_areas() {
    let mut map = Map::new();
    map.write_feature(Feature::boundary(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
    ]))
    .unwrap();
    map.write_feature(Feature::boundary(&[
        (1.0, 0.0),
        (4.0, 0.0),
        (4.0, 1.0),
        (1.0, 1.0),
        (1.0, 0.0),
    ]))
    .unwrap();

    let specs = [
        ToolSpec::new(Tool::Bpol, 0.0),
        ToolSpec::new(Tool::Rmdupl, 0.0),
        ToolSpec::new(Tool::Rmarea, 1.5),
    ];
    let report = clean(
        &mut map,
        &specs,
        KindMask::ALL,
        CleanOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(report.runs[0].modified, 3);
    assert_eq!(report.runs[1].modified, 1);
    assert_eq!(report.runs[2].modified, 1);

    assert_eq!(map.area_count(), 1);
    assert_relative_eq!(map.area(1).unwrap().size, 4.0);
}

#[test]
fn error_sink_collects_crossing_points() {
    let mut map = Map::new();
    map.write_feature(Feature::line(&[(0.0, 0.0), (2.0, 2.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(0.0, 2.0), (2.0, 0.0)]))
        .unwrap();

    let mut sink = Map::new();
    let specs = [ToolSpec::new(Tool::Break, 0.0)];
    clean(
        &mut map,
        &specs,
        KindMask::ALL,
        CleanOptions::default(),
        Some(&mut sink),
    )
    .unwrap();

    assert_eq!(sink.count(KindMask::POINTS), 1);
    let id = sink.ids().next().unwrap();
    let feature = sink.feature(id).unwrap();
    assert_eq!(feature.kind, FeatureKind::Point);
    assert_relative_eq!(feature.geometry.points[0].x, 1.0);
    assert_relative_eq!(feature.geometry.points[0].y, 1.0);
}

#[test]
fn removed_geometry_reaches_the_error_sink() {
    let mut map = Map::new();
    map.write_feature(Feature::boundary(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
    ]))
    .unwrap();
    map.write_feature(Feature::boundary(&[(1.0, 0.0), (1.5, -0.5)]))
        .unwrap();

    let mut sink = Map::new();
    let specs = [ToolSpec::new(Tool::Rmdangle, -1.0)];
    let report = clean(
        &mut map,
        &specs,
        KindMask::ALL,
        CleanOptions::default(),
        Some(&mut sink),
    )
    .unwrap();

    assert_eq!(report.total_modified(), 1);
    assert_eq!(map.count(KindMask::BOUNDARIES), 1);
    // The deleted stub lands in the sink exactly as it was drawn.
    assert_eq!(sink.count(KindMask::ALL), 1);
    let stub = sink.feature(1).unwrap();
    assert_eq!(stub.kind, FeatureKind::Boundary);
    assert_relative_eq!(stub.geometry.points[1].x, 1.5);
    assert_relative_eq!(stub.geometry.points[1].y, -0.5);
}

#[test]
fn report_survives_serialization() {
    let mut map = messy_lines();
    let specs = [
        ToolSpec::new(Tool::Break, 0.0),
        ToolSpec::new(Tool::Rmdupl, 0.0),
    ];
    let report = clean(
        &mut map,
        &specs,
        KindMask::ALL,
        CleanOptions::default(),
        None,
    )
    .unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let back: CleanReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.total_modified(), report.total_modified());
}
