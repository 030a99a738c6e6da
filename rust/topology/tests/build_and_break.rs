// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios: break lines, build topology, check the tables.

use approx::assert_relative_eq;
use vclean_geometry::{split_at_crossings, Point};
use vclean_topology::{BuildLevel, Feature, KindMask, Map};

#[test]
fn x_crossing_becomes_four_lines_around_one_node() {
    let mut map = Map::new();
    map.write_feature(Feature::line(&[(0.0, 0.0), (10.0, 10.0)]))
        .unwrap();
    map.write_feature(Feature::line(&[(0.0, 10.0), (10.0, 0.0)]))
        .unwrap();

    assert_eq!(map.break_lines(KindMask::LINE_LIKE, None), 2);
    map.build(BuildLevel::Base);

    assert_eq!(map.count(KindMask::LINE_LIKE), 4);
    // Four original endpoints plus the crossing.
    assert_eq!(map.node_count(), 5);
    let center = map.find_node(&Point::new(5.0, 5.0)).unwrap();
    assert_eq!(map.node(center).unwrap().ends.len(), 4);
}

#[test]
fn grid_of_four_cells() {
    let mut map = Map::new();
    for x in [0.0, 1.0, 2.0] {
        map.write_feature(Feature::boundary(&[(x, 0.0), (x, 2.0)]))
            .unwrap();
    }
    for y in [0.0, 1.0, 2.0] {
        map.write_feature(Feature::boundary(&[(0.0, y), (2.0, y)]))
            .unwrap();
    }
    map.break_lines(KindMask::BOUNDARIES, None);
    map.build(BuildLevel::All);

    // Every grid line is cut into unit edges.
    assert_eq!(map.count(KindMask::BOUNDARIES), 12);
    assert_eq!(map.area_count(), 4);
    for a in 1..=4 {
        assert_relative_eq!(map.area(a).unwrap().size, 1.0);
    }
    // One isle: the unbounded outside of the grid.
    assert_eq!(map.isle_count(), 1);
    assert_eq!(map.isle(1).unwrap().area, 0);
    // The center node joins four edges.
    let center = map.find_node(&Point::new(1.0, 1.0)).unwrap();
    assert_eq!(map.node(center).unwrap().ends.len(), 4);
}

#[test]
fn square_with_hole_and_centroids() {
    let mut map = Map::new();
    map.write_feature(Feature::boundary(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]))
    .unwrap();
    map.write_feature(Feature::boundary(&[
        (4.0, 4.0),
        (6.0, 4.0),
        (6.0, 6.0),
        (4.0, 6.0),
        (4.0, 4.0),
    ]))
    .unwrap();
    let outer_label = map
        .write_feature(Feature::centroid(Point::new(1.0, 1.0)).with_category(1, 10))
        .unwrap();
    let inner_label = map
        .write_feature(Feature::centroid(Point::new(5.0, 5.0)).with_category(1, 20))
        .unwrap();
    map.build(BuildLevel::All);

    assert_eq!(map.area_count(), 2);
    let outer = (1..=2)
        .find(|&a| map.area(a).unwrap().size > 50.0)
        .unwrap();
    let inner = 3 - outer;
    assert_relative_eq!(map.area(outer).unwrap().size, 100.0);
    assert_relative_eq!(map.area(inner).unwrap().size, 4.0);

    assert_eq!(map.area(outer).unwrap().centroid, outer_label);
    assert_eq!(map.area(inner).unwrap().centroid, inner_label);
    assert_eq!(map.features_with_category(1, 20), &[inner_label]);
}

#[test]
fn nested_isles_attach_to_smallest_enclosing_area() {
    let mut map = Map::new();
    for (lo, hi) in [(0.0, 10.0), (2.0, 8.0), (4.0, 6.0)] {
        map.write_feature(Feature::boundary(&[
            (lo, lo),
            (hi, lo),
            (hi, hi),
            (lo, hi),
            (lo, lo),
        ]))
        .unwrap();
    }
    map.build(BuildLevel::All);

    assert_eq!(map.area_count(), 3);
    assert_eq!(map.isle_count(), 3);

    let area_of_size = |s: f64| {
        (1..=3)
            .find(|&a| (map.area(a).unwrap().size - s).abs() < 1e-9)
            .unwrap()
    };
    let big = area_of_size(100.0);
    let mid = area_of_size(36.0);
    let small = area_of_size(4.0);

    // Each hole isle lands in the smallest area around it; the outermost
    // isle is the unbounded outside.
    let mut homes: Vec<i32> = (1..=3).map(|i| map.isle(i).unwrap().area).collect();
    homes.sort_unstable();
    let mut expected = vec![0, big, mid];
    expected.sort_unstable();
    assert_eq!(homes, expected);
    assert_eq!(map.area(big).unwrap().isles.len(), 1);
    assert_eq!(map.area(mid).unwrap().isles.len(), 1);
    assert!(map.area(small).unwrap().isles.is_empty());
}

#[test]
fn rebuild_after_edit_is_consistent() {
    let mut map = Map::new();
    let square = map
        .write_feature(Feature::boundary(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]))
        .unwrap();
    map.build(BuildLevel::All);
    assert_eq!(map.area_count(), 1);

    map.delete_feature(square).unwrap();
    map.build(BuildLevel::All);
    assert_eq!(map.area_count(), 0);
    assert_eq!(map.isle_count(), 0);

    map.write_feature(Feature::boundary(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 2.0),
        (0.0, 2.0),
        (0.0, 0.0),
    ]))
    .unwrap();
    map.build(BuildLevel::All);
    assert_eq!(map.area_count(), 1);
    assert_relative_eq!(map.area(1).unwrap().size, 4.0);
}

#[test]
fn breaking_reaches_a_fixed_point() {
    // A deterministic pseudo-random tangle of segments.
    let mut seed = 0x2545f491u64;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % 1000) as f64 / 100.0
    };

    let mut map = Map::new();
    for _ in 0..15 {
        let coords = [(next(), next()), (next(), next())];
        map.write_feature(Feature::line(&coords)).unwrap();
    }
    map.break_lines(KindMask::LINE_LIKE, None);

    // No live pair may cut the other anywhere but at shared endpoints.
    let ids: Vec<_> = map.ids().collect();
    for (i, &a) in ids.iter().enumerate() {
        let ga = &map.feature(a).unwrap().geometry;
        let self_res = split_at_crossings(ga, ga, true);
        assert!(self_res.a_parts.len() <= 1, "line {a} still self-intersects");
        for &b in &ids[i + 1..] {
            let gb = &map.feature(b).unwrap().geometry;
            let res = split_at_crossings(ga, gb, false);
            assert!(
                res.a_parts.len() <= 1 && res.b_parts.len() <= 1,
                "lines {a} and {b} still cross"
            );
        }
    }
    // A second pass finds nothing new.
    assert_eq!(map.break_lines(KindMask::LINE_LIKE, None), 0);
}
