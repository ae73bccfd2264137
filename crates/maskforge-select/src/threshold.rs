//! Automatic thresholding
//!
//! Otsu's method over a probability plane: build a 256-bin histogram,
//! maximize inter-class variance over all split points. The result is
//! clamped into [0.2, 0.8] so a degenerate plane can never produce an
//! all-or-nothing selection downstream.

use maskforge_core::{MASK_OFF, MASK_ON, Mask, ProbMap};

/// Lower clamp for the automatic threshold.
pub const OTSU_MIN: f32 = 0.2;
/// Upper clamp for the automatic threshold.
pub const OTSU_MAX: f32 = 0.8;

/// Compute Otsu's threshold for a probability plane.
///
/// Deterministic, pure function of the plane contents. Values are binned
/// into 256 buckets; the returned split is `bin / 255` clamped to
/// [`OTSU_MIN`, `OTSU_MAX`].
pub fn otsu_threshold(map: &ProbMap) -> f32 {
    let mut hist = [0u32; 256];
    for &v in map.data() {
        let bin = (v * 255.0).clamp(0.0, 255.0) as usize;
        hist[bin] += 1;
    }

    let mut sum = 0.0f32;
    for (i, &count) in hist.iter().enumerate() {
        sum += i as f32 * count as f32;
    }

    let mut weight_bg = 0u32;
    let mut sum_bg = 0.0f32;
    let mut max_variance = 0.0f32;
    let mut threshold = 127usize;

    for (t, &count) in hist.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }

        let weight_fg = map.len() as u32 - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += t as f32 * count as f32;
        let mean_bg = sum_bg / weight_bg as f32;
        let mean_fg = (sum - sum_bg) / weight_fg as f32;
        let between =
            weight_bg as f32 * weight_fg as f32 * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if between > max_variance {
            max_variance = between;
            threshold = t;
        }
    }

    (threshold as f32 / 255.0).clamp(OTSU_MIN, OTSU_MAX)
}

/// Binarize a probability plane at the given threshold (>= is foreground).
pub fn threshold_map(map: &ProbMap, threshold: f32) -> Mask {
    let data = map
        .data()
        .iter()
        .map(|&v| if v >= threshold { MASK_ON } else { MASK_OFF })
        .collect();
    Mask::from_vec(map.width(), map.height(), data).expect("probability map has valid dims")
}
