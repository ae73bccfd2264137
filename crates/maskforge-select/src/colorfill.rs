//! Color-similarity flood fill
//!
//! Single-click selection over raw pixel colors. Growth is bounded by two
//! tolerances at once: distance to the seed color (the user-facing
//! setting) and a tighter distance to the color of the pixel that
//! discovered the neighbor, which stops unbounded drift across smooth
//! gradients while still tolerating local sensor noise.

use image::RgbaImage;
use maskforge_core::{Connectivity, MASK_OFF, MASK_ON, Mask, Seed};
use maskforge_morph::{dilate, erode};

/// Options for color flood-fill selection.
///
/// All fields are clamped to their documented ranges when the fill runs, so
/// out-of-range values from a UI cannot break the algorithm.
#[derive(Debug, Clone)]
pub struct ColorFillOptions {
    /// Per-channel tolerance against the seed color (0-80).
    pub color_error: u8,
    /// Neighborhood used for growth and post-processing.
    pub connectivity: Connectivity,
    /// Dilate-then-erode rounds bridging thin seams (0-6).
    pub gap_closing: u8,
    /// Give edge pixels partial alpha instead of full opacity.
    pub antialias: bool,
}

impl Default for ColorFillOptions {
    fn default() -> Self {
        Self {
            color_error: 24,
            connectivity: Connectivity::FourWay,
            gap_closing: 0,
            antialias: false,
        }
    }
}

impl ColorFillOptions {
    pub fn new(color_error: u8) -> Self {
        Self {
            color_error,
            ..Self::default()
        }
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_gap_closing(mut self, rounds: u8) -> Self {
        self.gap_closing = rounds;
        self
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }
}

/// Flood-fill a selection from a seed pixel by color similarity.
///
/// The result is connected to the seed under the requested connectivity
/// (noise suppression may still drop isolated pixels); the seed pixel
/// itself is always part of the result.
pub fn color_select(source: &RgbaImage, seed: Seed, options: &ColorFillOptions) -> Mask {
    let width = source.width();
    let height = source.height();
    let pixel_count = width as usize * height as usize;

    let mut mask = Mask::new(width, height).expect("image has valid dims");
    if pixel_count == 0 {
        return mask;
    }

    let seed = seed.clamped(width, height);
    let color_error = i32::from(options.color_error.min(80));
    let gap_closing = options.gap_closing.min(6);
    let connectivity = options.connectivity;

    // Channel planes: the BFS touches each pixel several times and flat
    // arrays keep that cheap.
    let mut red = vec![0u8; pixel_count];
    let mut green = vec![0u8; pixel_count];
    let mut blue = vec![0u8; pixel_count];
    for (idx, pixel) in source.pixels().enumerate() {
        red[idx] = pixel[0];
        green[idx] = pixel[1];
        blue[idx] = pixel[2];
    }

    let seed_index = seed.index(width);
    let (seed_r, seed_g, seed_b) = seed_median_color(&red, &green, &blue, width, height, seed);
    let neighbor_tolerance = ((f64::from(color_error) * 0.55).round() as i32).clamp(2, 64);

    let mut visited = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut head = 0usize;
    let mut tail = 0usize;

    visited[seed_index] = true;
    queue[tail] = seed_index;
    tail += 1;

    while head < tail {
        let idx = queue[head];
        head += 1;
        mask.data_mut()[idx] = MASK_ON;

        let x = (idx % width as usize) as i64;
        let y = (idx / width as usize) as i64;

        let mut enqueue_if_match = |nx: i64, ny: i64| {
            if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                return;
            }
            let n = ny as usize * width as usize + nx as usize;
            if visited[n] {
                return;
            }
            visited[n] = true;
            if !within_tolerance(
                (red[n], green[n], blue[n]),
                (seed_r, seed_g, seed_b),
                color_error,
            ) {
                return;
            }
            if !within_tolerance(
                (red[n], green[n], blue[n]),
                (red[idx], green[idx], blue[idx]),
                neighbor_tolerance,
            ) {
                return;
            }
            queue[tail] = n;
            tail += 1;
        };

        enqueue_if_match(x - 1, y);
        enqueue_if_match(x + 1, y);
        enqueue_if_match(x, y - 1);
        enqueue_if_match(x, y + 1);
        if connectivity == Connectivity::EightWay {
            enqueue_if_match(x - 1, y - 1);
            enqueue_if_match(x + 1, y - 1);
            enqueue_if_match(x - 1, y + 1);
            enqueue_if_match(x + 1, y + 1);
        }
    }

    if gap_closing > 0 {
        for _ in 0..gap_closing {
            let dilated = dilate(&mask, connectivity);
            mask = erode(&dilated, connectivity);
        }
    }

    suppress_noise(&mut mask, connectivity, color_error);

    if options.antialias {
        apply_antialias(&mut mask, connectivity);
    }

    mask.data_mut()[seed_index] = MASK_ON;
    mask
}

/// Per-channel median over the seed's 3×3 neighborhood. Robust against a
/// single noisy sensor pixel right under the click.
fn seed_median_color(
    red: &[u8],
    green: &[u8],
    blue: &[u8],
    width: u32,
    height: u32,
    seed: Seed,
) -> (u8, u8, u8) {
    let mut rs = [0u8; 9];
    let mut gs = [0u8; 9];
    let mut bs = [0u8; 9];
    let mut count = 0usize;

    for oy in -1i64..=1 {
        let y = seed.y as i64 + oy;
        if y < 0 || y >= i64::from(height) {
            continue;
        }
        let row = y as usize * width as usize;
        for ox in -1i64..=1 {
            let x = seed.x as i64 + ox;
            if x < 0 || x >= i64::from(width) {
                continue;
            }
            let idx = row + x as usize;
            rs[count] = red[idx];
            gs[count] = green[idx];
            bs[count] = blue[idx];
            count += 1;
        }
    }

    if count == 0 {
        let idx = seed.index(width);
        return (red[idx], green[idx], blue[idx]);
    }

    rs[..count].sort_unstable();
    gs[..count].sort_unstable();
    bs[..count].sort_unstable();
    let mid = count / 2;
    (rs[mid], gs[mid], bs[mid])
}

#[inline]
fn within_tolerance(color: (u8, u8, u8), reference: (u8, u8, u8), tolerance: i32) -> bool {
    (i32::from(color.0) - i32::from(reference.0)).abs() <= tolerance
        && (i32::from(color.1) - i32::from(reference.1)).abs() <= tolerance
        && (i32::from(color.2) - i32::from(reference.2)).abs() <= tolerance
}

/// Kill isolated "on" pixels and fill nearly surrounded "off" pixels.
///
/// Runs one pass, two when the tolerance is loose (noisy selections leave
/// more debris). Each pass reads a snapshot and writes into the live mask;
/// only interior pixels are considered.
fn suppress_noise(mask: &mut Mask, connectivity: Connectivity, color_error: i32) {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    if mask.len() == 0 || width < 3 || height < 3 {
        return;
    }

    let passes = if color_error >= 24 { 2 } else { 1 };
    let fill_threshold = match connectivity {
        Connectivity::EightWay => 7,
        Connectivity::FourWay => 4,
    };

    for _ in 0..passes {
        let snapshot = mask.clone();
        for y in 1..height - 1 {
            let row = y * width;
            for x in 1..width - 1 {
                let idx = row + x;
                let neighbor_count = maskforge_morph::selected_neighbor_count(
                    &snapshot,
                    x as u32,
                    y as u32,
                    connectivity,
                );

                if snapshot.data()[idx] == MASK_ON {
                    if neighbor_count <= 1 {
                        mask.data_mut()[idx] = MASK_OFF;
                    }
                } else if neighbor_count >= fill_threshold {
                    mask.data_mut()[idx] = MASK_ON;
                }
            }
        }
    }
}

/// Soften interior edge pixels: a selected pixel with fewer than the
/// maximum possible selected neighbors gets partial alpha proportional to
/// its neighbor count.
fn apply_antialias(mask: &mut Mask, connectivity: Connectivity) {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    if mask.len() == 0 || width < 3 || height < 3 {
        return;
    }

    let snapshot = mask.clone();
    let max_neighbors = connectivity.neighbor_count();

    for y in 1..height - 1 {
        let row = y * width;
        for x in 1..width - 1 {
            let idx = row + x;
            if snapshot.data()[idx] == 0 {
                continue;
            }

            let neighbor_count = maskforge_morph::selected_neighbor_count(
                &snapshot,
                x as u32,
                y as u32,
                connectivity,
            );
            if neighbor_count >= max_neighbors {
                continue;
            }

            let softened = match connectivity {
                Connectivity::EightWay => 120 + neighbor_count as i32 * 16,
                Connectivity::FourWay => 136 + neighbor_count as i32 * 24,
            };
            mask.data_mut()[idx] = softened.clamp(96, 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_seed_median_ignores_outlier() {
        let red = vec![100u8; 25];
        let mut green = vec![100u8; 25];
        let blue = vec![100u8; 25];
        green[12] = 255; // hot pixel right under the click
        let (r, g, b) = seed_median_color(&red, &green, &blue, 5, 5, Seed::new(2, 2));
        assert_eq!((r, g, b), (100, 100, 100));
    }

    #[test]
    fn test_mild_seed_noise_does_not_shift_the_window() {
        // The clicked pixel is slightly off; the tolerance window centers
        // on the neighborhood median, so the whole plane still matches.
        let mut image = solid_image(5, 5, [100, 100, 100, 255]);
        image.put_pixel(2, 2, Rgba([103, 103, 103, 255]));
        let mask = color_select(&image, Seed::new(2, 2), &ColorFillOptions::new(10));
        assert_eq!(mask.count_nonzero(), 25);
    }

    #[test]
    fn test_uniform_image_selects_everything() {
        let image = solid_image(8, 8, [10, 200, 60, 255]);
        let mask = color_select(&image, Seed::new(3, 3), &ColorFillOptions::new(0));
        assert_eq!(mask.count_nonzero(), 64);
    }

    #[test]
    fn test_gradient_drift_is_bounded() {
        // Horizontal ramp, 4 units per column: each step passes the
        // neighbor tolerance but the seed tolerance cuts the fill off.
        let mut image = RgbaImage::new(64, 4);
        for (x, _, pixel) in image.enumerate_pixels_mut() {
            let v = (x * 4).min(255) as u8;
            *pixel = Rgba([v, v, v, 255]);
        }
        let options = ColorFillOptions::new(20);
        let mask = color_select(&image, Seed::new(0, 1), &options);
        assert!(mask.get(0, 1) == MASK_ON);
        assert_eq!(mask.get(30, 1), MASK_OFF);
    }

    #[test]
    fn test_seed_always_included() {
        // Seed on a lone dark pixel: nothing matches, noise suppression
        // clears nothing it shouldn't, and the seed is forced on.
        let mut image = solid_image(7, 7, [240, 240, 240, 255]);
        image.put_pixel(3, 3, Rgba([0, 0, 0, 255]));
        // Make the median dark too by darkening the whole 3x3 block
        for y in 2..5 {
            for x in 2..5 {
                image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let mask = color_select(&image, Seed::new(3, 3), &ColorFillOptions::new(5));
        assert_eq!(mask.get(3, 3), MASK_ON);
    }

    #[test]
    fn test_antialias_softens_edges() {
        let mut image = solid_image(12, 12, [255, 255, 255, 255]);
        for y in 3..9 {
            for x in 3..9 {
                image.put_pixel(x, y, Rgba([200, 30, 30, 255]));
            }
        }
        let options = ColorFillOptions::new(10)
            .with_connectivity(Connectivity::EightWay)
            .with_antialias(true);
        let mask = color_select(&image, Seed::new(5, 5), &options);
        // Corner of the square has fewer selected neighbors than interior
        let corner = mask.get(3, 3);
        assert!(corner > 0 && corner < 255, "corner alpha = {corner}");
        assert_eq!(mask.get(5, 5), MASK_ON);
    }

    #[test]
    fn test_options_clamped() {
        let image = solid_image(4, 4, [50, 50, 50, 255]);
        let options = ColorFillOptions {
            color_error: 200,
            connectivity: Connectivity::EightWay,
            gap_closing: 40,
            antialias: false,
        };
        // Out-of-range settings behave as their clamped values
        let mask = color_select(&image, Seed::new(1, 1), &options);
        assert_eq!(mask.count_nonzero(), 16);
    }
}
