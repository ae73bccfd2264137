//! Inference output post-processing
//!
//! Turns a raw model output plane into a probability plane at the source
//! resolution: min-max normalization, corner-aligned bilinear upscale, and
//! the mirror/average helpers used by flip-augmented multi-pass inference.

/// Min-max normalize a plane into [0,1] in place.
///
/// A nearly constant plane (range below 1e-6) becomes all zeros instead of
/// amplifying numeric noise into a full-range map.
pub fn normalize_in_place(values: &mut [f32]) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in values.iter() {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    let range = max - min;
    if range < 1e-6 {
        values.fill(0.0);
        return;
    }

    for v in values.iter_mut() {
        *v = (*v - min) / range;
    }
}

/// Corner-aligned bilinear resize of a float plane.
pub fn resize_bilinear(
    source: &[f32],
    source_width: usize,
    source_height: usize,
    target_width: usize,
    target_height: usize,
) -> Vec<f32> {
    if source_width == target_width && source_height == target_height {
        return source.to_vec();
    }

    let mut target = vec![0.0f32; target_width * target_height];
    let y_scale = if target_height > 1 {
        (source_height - 1) as f64 / (target_height - 1) as f64
    } else {
        0.0
    };
    let x_scale = if target_width > 1 {
        (source_width - 1) as f64 / (target_width - 1) as f64
    } else {
        0.0
    };

    for y in 0..target_height {
        let fy = y as f64 * y_scale;
        let y0 = fy as usize;
        let y1 = (y0 + 1).min(source_height - 1);
        let wy = (fy - y0 as f64) as f32;

        let dst_row = y * target_width;
        let src_row0 = y0 * source_width;
        let src_row1 = y1 * source_width;

        for x in 0..target_width {
            let fx = x as f64 * x_scale;
            let x0 = fx as usize;
            let x1 = (x0 + 1).min(source_width - 1);
            let wx = (fx - x0 as f64) as f32;

            let top = source[src_row0 + x0] + (source[src_row0 + x1] - source[src_row0 + x0]) * wx;
            let bottom =
                source[src_row1 + x0] + (source[src_row1 + x1] - source[src_row1 + x0]) * wx;
            target[dst_row + x] = top + (bottom - top) * wy;
        }
    }

    target
}

/// Mirror a plane left-right in place.
pub fn mirror_horizontal_in_place(map: &mut [f32], width: usize, height: usize) {
    for y in 0..height {
        let row = y * width;
        for x in 0..width / 2 {
            map.swap(row + x, row + width - 1 - x);
        }
    }
}

/// Mirror a plane top-bottom in place.
pub fn mirror_vertical_in_place(map: &mut [f32], width: usize, height: usize) {
    for y in 0..height / 2 {
        let top = y * width;
        let bottom = (height - 1 - y) * width;
        for x in 0..width {
            map.swap(top + x, bottom + x);
        }
    }
}

/// Average four orientation maps into the first, clamped to [0,1].
pub fn average_maps_in_place(base: &mut [f32], others: [&[f32]; 3]) {
    for (i, v) in base.iter_mut().enumerate() {
        *v = ((*v + others[0][i] + others[1][i] + others[2][i]) * 0.25).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spans_unit_range() {
        let mut values = vec![-2.0, 0.0, 6.0];
        normalize_in_place(&mut values);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[2], 1.0);
        assert!((values[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_degenerate_goes_to_zero() {
        let mut values = vec![3.5; 10];
        normalize_in_place(&mut values);
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_resize_identity() {
        let source = vec![0.1, 0.2, 0.3, 0.4];
        let out = resize_bilinear(&source, 2, 2, 2, 2);
        assert_eq!(out, source);
    }

    #[test]
    fn test_resize_preserves_corners() {
        let source = vec![0.0, 1.0, 0.5, 0.25];
        let out = resize_bilinear(&source, 2, 2, 5, 5);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[4], 1.0);
        assert_eq!(out[20], 0.5);
        assert_eq!(out[24], 0.25);
    }

    #[test]
    fn test_resize_interpolates_midpoint() {
        let source = vec![0.0, 1.0];
        let out = resize_bilinear(&source, 2, 1, 3, 1);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_horizontal_roundtrip() {
        let original = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut map = original.clone();
        mirror_horizontal_in_place(&mut map, 3, 2);
        assert_eq!(map, vec![3.0, 2.0, 1.0, 6.0, 5.0, 4.0]);
        mirror_horizontal_in_place(&mut map, 3, 2);
        assert_eq!(map, original);
    }

    #[test]
    fn test_mirror_vertical_roundtrip() {
        let original = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut map = original.clone();
        mirror_vertical_in_place(&mut map, 2, 3);
        assert_eq!(map, vec![5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
        mirror_vertical_in_place(&mut map, 2, 3);
        assert_eq!(map, original);
    }

    #[test]
    fn test_average_clamps() {
        let mut base = vec![0.8, 0.0];
        let a = vec![0.9, 0.0];
        let b = vec![1.2, 0.0];
        let c = vec![1.5, 0.4];
        average_maps_in_place(&mut base, [&a, &b, &c]);
        assert_eq!(base[0], 1.0);
        assert!((base[1] - 0.1).abs() < 1e-6);
    }
}
