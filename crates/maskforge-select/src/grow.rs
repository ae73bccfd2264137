//! Seeded region growing
//!
//! Single-click subject selection over a probability plane. The grower
//! balances precision (no bleeding into adjacent objects) against recall
//! (capture low-confidence interior regions) with hysteresis thresholding
//! followed by a bounded connectivity expansion, all without a second user
//! input.

use crate::threshold::threshold_map;
use maskforge_core::{Connectivity, MASK_ON, Mask, ProbMap, Seed};
use maskforge_morph::{
    close, dilate_n, fill_holes, keep_component_containing, merge_touching_components, open,
};

/// Radius of the window used to estimate local probability variation
/// around the seed.
const LOCAL_STATS_RADIUS: i64 = 8;

/// Iterations of dilation defining the anchor zone for expansion.
const ANCHOR_DILATIONS: u32 = 12;

/// Expansion is reverted when the merged selection exceeds this fraction
/// of the plane.
const EXPLOSION_AREA_FRACTION: f64 = 0.78;
/// Expansion is reverted when the merged selection exceeds this multiple
/// of the seed-only selection (and an eighth of the plane).
const EXPLOSION_SEED_FACTOR: usize = 9;

/// Grow a selection from a single seed over a probability plane.
///
/// Returns an empty mask (never an error) when the seed cannot support a
/// viable selection: sub-threshold seed, or the anchor lost after the
/// expansion safety check.
pub fn grow_from_seed(map: &ProbMap, seed: Seed, otsu: f32) -> Mask {
    let width = map.width();
    let height = map.height();
    let seed = seed.clamped(width, height);
    let seed_confidence = map.get(seed.x, seed.y);

    let (_, local_std) = local_stats(map, seed, LOCAL_STATS_RADIUS);
    let affinity = affinity_map(map, seed, seed_confidence);

    let mut high_threshold = (0.84 - local_std * 1.15).clamp(0.58, 0.93);
    if seed_confidence < otsu {
        high_threshold = (high_threshold - 0.05).max(0.56);
    }
    let low_threshold = (high_threshold - 0.23).clamp(0.30, 0.88);

    let root = seed.index(width);
    let mask = hysteresis_grow(&affinity, root, high_threshold, low_threshold);
    if mask.is_blank() {
        return blank_like(map);
    }

    let mask = close(&mask, Connectivity::EightWay);
    let mask = open(&mask, Connectivity::EightWay);
    let mask = fill_holes(&mask);
    let mask = expand_by_connectivity(&mask, &affinity, map, seed_confidence, otsu);
    let mask = close(&mask, Connectivity::EightWay);
    let mask = fill_holes(&mask);

    let mut anchor = root;
    if mask.data()[anchor] == 0 {
        let max_radius = 16.max(width.min(height) as i64 / 12);
        match nearest_mask_pixel(&mask, seed, max_radius) {
            Some(index) => anchor = index,
            None => return blank_like(map),
        }
    }

    match keep_component_containing(&mask, anchor) {
        Some(kept) => kept,
        None => blank_like(map),
    }
}

/// Per-pixel affinity to the seed: probability similarity damped by a
/// spatial Gaussian so far-away lookalikes score lower.
pub(crate) fn affinity_map(map: &ProbMap, seed: Seed, seed_confidence: f32) -> ProbMap {
    let width = map.width() as usize;
    let height = map.height() as usize;
    let sigma = 24.0f64.max(f64::from(map.width().min(map.height())) * 0.22);
    let sigma_sq2 = 2.0 * sigma * sigma;

    let mut affinity = vec![0.0f32; width * height];
    for y in 0..height {
        let row = y * width;
        let dy = y as i64 - seed.y as i64;
        for x in 0..width {
            let idx = row + x;
            let dx = x as i64 - seed.x as i64;

            let similarity = (1.0 - (map.data()[idx] - seed_confidence).abs()).clamp(0.0, 1.0);
            let distance_sq = (dx * dx + dy * dy) as f64;
            let spatial = (-distance_sq / sigma_sq2).exp() as f32;
            affinity[idx] = (similarity * (0.55 + 0.45 * spatial)).clamp(0.0, 1.0);
        }
    }

    ProbMap::from_vec(map.width(), map.height(), affinity).expect("same dims as input map")
}

/// Mean and standard deviation of the plane in a clamped window around the
/// seed.
pub(crate) fn local_stats(map: &ProbMap, center: Seed, radius: i64) -> (f32, f32) {
    let min_x = (center.x as i64 - radius).max(0) as u32;
    let max_x = (center.x as i64 + radius).min(map.width() as i64 - 1) as u32;
    let min_y = (center.y as i64 - radius).max(0) as u32;
    let max_y = (center.y as i64 + radius).min(map.height() as i64 - 1) as u32;

    let mut sum = 0.0f32;
    let mut sum_sq = 0.0f32;
    let mut count = 0u32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let v = map.get(x, y);
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
    }

    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f32;
    let variance = (sum_sq / count as f32 - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

/// Hysteresis BFS from the root over an affinity plane.
///
/// A dequeued pixel below `low` is dropped. A neighbor is admitted when it
/// is at least `low`, unless the drop from the growing front exceeds 0.40
/// while the neighbor is still under `high`; that sharp-descent rule is
/// what stops the fill at soft object boundaries.
fn hysteresis_grow(affinity: &ProbMap, root: usize, high: f32, low: f32) -> Mask {
    let width = affinity.width() as usize;
    let height = affinity.height() as usize;
    let pixel_count = width * height;
    let values = affinity.data();

    let mut mask = vec![0u8; pixel_count];
    let mut visited = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut head = 0usize;
    let mut tail = 0usize;

    queue[tail] = root;
    tail += 1;
    visited[root] = true;

    while head < tail {
        let idx = queue[head];
        head += 1;
        let center = values[idx];
        if center < low {
            continue;
        }

        mask[idx] = MASK_ON;
        let x = idx % width;
        let y = idx / width;

        let mut visit = |nx: i64, ny: i64| {
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                return;
            }
            let n = ny as usize * width + nx as usize;
            if visited[n] {
                return;
            }
            visited[n] = true;

            let p = values[n];
            if p < low {
                return;
            }
            if center - p > 0.40 && p < high {
                return;
            }
            queue[tail] = n;
            tail += 1;
        };

        let xi = x as i64;
        let yi = y as i64;
        visit(xi - 1, yi);
        visit(xi + 1, yi);
        visit(xi, yi - 1);
        visit(xi, yi + 1);
        visit(xi - 1, yi - 1);
        visit(xi + 1, yi - 1);
        visit(xi - 1, yi + 1);
        visit(xi + 1, yi + 1);
    }

    Mask::from_vec(affinity.width(), affinity.height(), mask).expect("same dims as affinity")
}

/// Bounded connectivity expansion.
///
/// Recovers low-confidence interior regions the hysteresis pass missed by
/// merging candidate components that touch a dilated anchor zone. Two
/// candidate sources are tried: a relaxed affinity threshold and a relaxed
/// objectness (raw probability) threshold. The merge is reverted wholesale
/// when the grown area trips the explosion guard.
fn expand_by_connectivity(
    seed_mask: &Mask,
    affinity: &ProbMap,
    probability: &ProbMap,
    seed_confidence: f32,
    otsu: f32,
) -> Mask {
    let mut merged = seed_mask.clone();
    let mut anchor = dilate_n(seed_mask, ANCHOR_DILATIONS);

    let relaxed_affinity = (0.46 - (otsu - 0.5) * 0.12).clamp(0.34, 0.58);
    let affinity_candidate = threshold_map(affinity, relaxed_affinity);
    if merge_touching_components(&mut merged, &mut anchor, &affinity_candidate).is_err() {
        return seed_mask.clone();
    }

    let objectness = (otsu * 0.9).min(seed_confidence - 0.08).clamp(0.22, 0.70);
    let objectness_candidate = threshold_map(probability, objectness);
    if merge_touching_components(&mut merged, &mut anchor, &objectness_candidate).is_err() {
        return seed_mask.clone();
    }

    let image_pixels = seed_mask.len();
    let merged_count = merged.count_nonzero();
    let seed_count = seed_mask.count_nonzero();
    if merged_count as f64 > image_pixels as f64 * EXPLOSION_AREA_FRACTION
        || merged_count > (seed_count * EXPLOSION_SEED_FACTOR).max(image_pixels / 8)
    {
        return seed_mask.clone();
    }

    if merged_count > seed_count {
        merged
    } else {
        seed_mask.clone()
    }
}

/// Nearest selected pixel to the seed within a Euclidean radius, or `None`.
fn nearest_mask_pixel(mask: &Mask, seed: Seed, max_radius: i64) -> Option<usize> {
    let width = mask.width() as usize;
    let max_distance_sq = max_radius * max_radius;
    let mut best_index = None;
    let mut best_distance_sq = i64::MAX;

    for (i, &v) in mask.data().iter().enumerate() {
        if v == 0 {
            continue;
        }
        let x = (i % width) as i64;
        let y = (i / width) as i64;
        let dx = x - seed.x as i64;
        let dy = y - seed.y as i64;
        let distance_sq = dx * dx + dy * dy;
        if distance_sq > max_distance_sq || distance_sq >= best_distance_sq {
            continue;
        }
        best_distance_sq = distance_sq;
        best_index = Some(i);
        if distance_sq == 0 {
            break;
        }
    }

    best_index
}

fn blank_like(map: &ProbMap) -> Mask {
    Mask::new(map.width(), map.height()).expect("probability map has valid dims")
}
