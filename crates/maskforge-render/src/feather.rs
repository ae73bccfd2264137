//! Boundary naturalization
//!
//! Converts a hard selection edge into a gradual alpha ramp so blended
//! edits do not leave a visible seam. The ramp comes from a multi-source
//! BFS distance transform growing inward from the background, shaped by a
//! smoothstep curve, then softened further with a separable box blur. Deep
//! interior pixels are re-promoted to full opacity afterwards so the blur
//! cannot thin out the solid core.

use maskforge_core::{MASK_ON, Mask};

/// Distance over which the alpha ramp rises to full opacity.
const FEATHER_RADIUS: i32 = 10;
/// Exponent applied to the smoothstep ramp; higher keeps the edge tighter.
const FEATHER_GAMMA: f32 = 1.75;
/// Radius of each box-blur pass.
const BLUR_RADIUS: i32 = 2;
/// Number of box-blur passes.
const BLUR_PASSES: i32 = 2;

/// Soften a hard mask into an alpha ramp.
///
/// Foreground pixels within [`FEATHER_RADIUS`] of the background get
/// `value · smoothstep(d/radius)^gamma`; deeper pixels keep their value.
/// Two box-blur passes follow, and originally fully-on pixels far enough
/// inside are restored to 255. A mask with no background at all is
/// returned unchanged.
pub fn naturalize_boundary(mask: &Mask) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let pixel_count = width * height;

    let mut softened = mask.clone();
    if width <= 1 || height <= 1 || pixel_count == 0 {
        return softened;
    }

    // Multi-source BFS from every background pixel. The cap keeps the
    // transform from walking the whole interior of a large selection.
    let expand_cap = FEATHER_RADIUS + BLUR_RADIUS * BLUR_PASSES + 1;
    let mut distances = vec![-1i32; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut head = 0usize;
    let mut tail = 0usize;

    for (i, &v) in mask.data().iter().enumerate() {
        if v == 0 {
            distances[i] = 0;
            queue[tail] = i;
            tail += 1;
        }
    }

    if tail == 0 {
        return softened;
    }

    while head < tail {
        let idx = queue[head];
        head += 1;
        let base_distance = distances[idx];
        if base_distance >= expand_cap {
            continue;
        }

        let x = (idx % width) as i64;
        let y = (idx / width) as i64;
        for oy in -1i64..=1 {
            let ny = y + oy;
            if ny < 0 || ny >= height as i64 {
                continue;
            }
            let row = ny as usize * width;
            for ox in -1i64..=1 {
                if ox == 0 && oy == 0 {
                    continue;
                }
                let nx = x + ox;
                if nx < 0 || nx >= width as i64 {
                    continue;
                }
                let next = row + nx as usize;
                if distances[next] >= 0 {
                    continue;
                }
                distances[next] = base_distance + 1;
                queue[tail] = next;
                tail += 1;
            }
        }
    }

    for i in 0..pixel_count {
        let current = mask.data()[i];
        if current == 0 {
            continue;
        }
        let distance = distances[i];
        if distance < 0 || distance >= FEATHER_RADIUS {
            continue;
        }

        let t = (distance as f32 / FEATHER_RADIUS as f32).clamp(0.0, 1.0);
        let smooth = t * t * (3.0 - 2.0 * t);
        let factor = smooth.powf(FEATHER_GAMMA);
        softened.data_mut()[i] = (current as f32 * factor).round().clamp(0.0, 255.0) as u8;
    }

    let mut blurred = softened;
    for _ in 0..BLUR_PASSES {
        blurred = box_blur(&blurred, BLUR_RADIUS);
    }

    let preserve_threshold = FEATHER_RADIUS + BLUR_RADIUS * BLUR_PASSES;
    for i in 0..pixel_count {
        if mask.data()[i] == MASK_ON && distances[i] >= preserve_threshold {
            blurred.data_mut()[i] = MASK_ON;
        }
    }

    blurred
}

/// Separable box blur over a mask plane with running-sum rows and columns.
pub fn box_blur(mask: &Mask, radius: i32) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    if radius <= 0 || mask.len() == 0 {
        return mask.clone();
    }
    let radius = radius as usize;
    let source = mask.data();

    let mut horizontal = vec![0u8; source.len()];
    for y in 0..height {
        let row = y * width;
        let mut sum: u32 = 0;
        for x in 0..=radius.min(width - 1) {
            sum += source[row + x] as u32;
        }

        for x in 0..width {
            let left = x.saturating_sub(radius);
            let right = (x + radius).min(width - 1);
            let count = (right - left + 1) as u32;
            horizontal[row + x] = (sum / count) as u8;

            if x >= radius {
                sum -= source[row + x - radius] as u32;
            }
            if x + radius + 1 < width {
                sum += source[row + x + radius + 1] as u32;
            }
        }
    }

    let mut output = vec![0u8; source.len()];
    for x in 0..width {
        let mut sum: u32 = 0;
        for y in 0..=radius.min(height - 1) {
            sum += horizontal[y * width + x] as u32;
        }

        for y in 0..height {
            let top = y.saturating_sub(radius);
            let bottom = (y + radius).min(height - 1);
            let count = (bottom - top + 1) as u32;
            output[y * width + x] = (sum / count) as u8;

            if y >= radius {
                sum -= horizontal[(y - radius) * width + x] as u32;
            }
            if y + radius + 1 < height {
                sum += horizontal[(y + radius + 1) * width + x] as u32;
            }
        }
    }

    Mask::from_vec(mask.width(), mask.height(), output).expect("same dims as input")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_background_returns_unchanged() {
        let mut mask = Mask::new(16, 16).unwrap();
        mask.data_mut().fill(MASK_ON);
        let softened = naturalize_boundary(&mask);
        assert_eq!(softened, mask);
    }

    #[test]
    fn test_blank_mask_stays_blank() {
        let mask = Mask::new(8, 8).unwrap();
        let softened = naturalize_boundary(&mask);
        assert!(softened.is_blank());
    }

    #[test]
    fn test_edge_pixels_are_softened() {
        // Right-hand region of a wide plane; the boundary column gets a
        // much weaker alpha than the deep interior.
        let mut mask = Mask::new(48, 16).unwrap();
        for y in 0..16 {
            for x in 8..48 {
                mask.set(x, y, MASK_ON);
            }
        }
        let softened = naturalize_boundary(&mask);
        assert!(softened.get(8, 8) < 64);
        assert_eq!(softened.get(40, 8), MASK_ON);
    }

    #[test]
    fn test_box_blur_preserves_flat_regions() {
        let mut mask = Mask::new(10, 10).unwrap();
        mask.data_mut().fill(200);
        let blurred = box_blur(&mask, 2);
        assert!(blurred.data().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_box_blur_radius_zero_is_identity() {
        let mut mask = Mask::new(4, 4).unwrap();
        mask.set(1, 1, 90);
        assert_eq!(box_blur(&mask, 0), mask);
    }
}
