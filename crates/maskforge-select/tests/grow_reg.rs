//! Seeded region growing regression test
//!
//! Pins the end-to-end single-click selection behavior on synthetic
//! probability planes: whole-plane selection, blob separation across a
//! dark gap, seed inclusion, and the empty-result contract.

use maskforge_core::{MASK_ON, ProbMap, Seed};
use maskforge_select::{build_global_mask, grow_from_seed, otsu_threshold};

/// Two 5×5 bright blobs separated by a 3-pixel dark gap: columns 0-4 and
/// 8-12 at 0.9, columns 5-7 at 0.1.
fn two_blob_map() -> ProbMap {
    let mut data = vec![0.1f32; 13 * 5];
    for y in 0..5 {
        for x in 0..5 {
            data[y * 13 + x] = 0.9;
        }
        for x in 8..13 {
            data[y * 13 + x] = 0.9;
        }
    }
    ProbMap::from_vec(13, 5, data).unwrap()
}

#[test]
fn uniform_plane_selects_all_pixels() {
    let map = ProbMap::filled(4, 4, 0.9).unwrap();
    let otsu = otsu_threshold(&map);
    let mask = build_global_mask(&map, otsu);
    assert_eq!(mask.count_nonzero(), 16);
}

#[test]
fn seeded_growth_stays_inside_blob_a() {
    let map = two_blob_map();
    let otsu = otsu_threshold(&map);
    let mask = grow_from_seed(&map, Seed::new(2, 2), otsu);

    assert_eq!(mask.count_nonzero(), 25, "expected exactly blob A");
    for y in 0..5 {
        for x in 0..5 {
            assert_eq!(mask.get(x, y), MASK_ON, "blob A pixel ({x},{y})");
        }
        for x in 5..13 {
            assert_eq!(mask.get(x, y), 0, "pixel ({x},{y}) outside blob A");
        }
    }
}

#[test]
fn seeded_growth_from_blob_b_mirrors() {
    let map = two_blob_map();
    let otsu = otsu_threshold(&map);
    let mask = grow_from_seed(&map, Seed::new(10, 2), otsu);
    assert_eq!(mask.count_nonzero(), 25);
    assert_eq!(mask.get(10, 2), MASK_ON);
    assert_eq!(mask.get(2, 2), 0);
}

#[test]
fn non_empty_growth_always_contains_the_seed() {
    let map = two_blob_map();
    let otsu = otsu_threshold(&map);
    for &(x, y) in &[(0, 0), (2, 2), (4, 4), (9, 1), (12, 4)] {
        let mask = grow_from_seed(&map, Seed::new(x, y), otsu);
        if !mask.is_blank() {
            assert_eq!(mask.get(x, y), MASK_ON, "seed ({x},{y}) missing from result");
        }
    }
}

#[test]
fn whole_plane_growth_survives_the_explosion_guard() {
    // On a uniform plane the expansion trips the area guard and reverts to
    // the pre-merge mask, which already covers everything.
    let map = ProbMap::filled(16, 16, 0.85).unwrap();
    let otsu = otsu_threshold(&map);
    let mask = grow_from_seed(&map, Seed::new(8, 8), otsu);
    assert_eq!(mask.count_nonzero(), 256);
}

#[test]
fn growth_result_is_connected_to_the_seed() {
    // A lookalike blob far from the seed must not appear in the result
    // when no 4-connected path survives the cleanup.
    let mut data = vec![0.05f32; 40 * 40];
    for y in 2..8 {
        for x in 2..8 {
            data[y * 40 + x] = 0.9;
        }
    }
    for y in 30..36 {
        for x in 30..36 {
            data[y * 40 + x] = 0.9;
        }
    }
    let map = ProbMap::from_vec(40, 40, data).unwrap();
    let otsu = otsu_threshold(&map);
    let mask = grow_from_seed(&map, Seed::new(4, 4), otsu);

    assert!(mask.get(4, 4) == MASK_ON);
    assert_eq!(mask.get(32, 32), 0, "distant blob must stay unselected");
}
