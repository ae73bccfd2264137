//! Adjustment pipeline
//!
//! A fixed sequence of pure per-image steps: pixel pass (exposure,
//! temperature, tint, brightness, contrast, shadows/highlights, gamma,
//! vignette), saturation, clarity, blur, sharpen. The order is a documented
//! contract; each step is independently testable and skips itself below its
//! own epsilon, so identity parameters cost one clone and nothing else.

use image::RgbaImage;
use image::imageops;
use maskforge_core::AdjustmentParams;
use rayon::prelude::*;

/// Render a fully adjusted copy of `source`.
pub fn render_adjusted(source: &RgbaImage, params: &AdjustmentParams) -> RgbaImage {
    if params.is_default() {
        return source.clone();
    }

    let mut image = source.clone();
    apply_pixel_adjustments(&mut image, params);
    apply_saturation(&mut image, params);
    apply_clarity(&mut image, params);
    apply_blur(&mut image, params);
    apply_sharpen(&mut image, params);
    image
}

/// Combined per-pixel pass. One traversal covers every control that maps a
/// single input pixel to a single output pixel.
pub fn apply_pixel_adjustments(image: &mut RgbaImage, params: &AdjustmentParams) {
    let need_pass = params.exposure.abs() > 0.01
        || params.temperature.abs() > 0.01
        || params.tint.abs() > 0.01
        || (params.brightness - 1.0).abs() > 0.001
        || (params.contrast - 1.0).abs() > 0.001
        || params.shadows.abs() > 0.01
        || params.highlights.abs() > 0.01
        || (params.gamma - 1.0).abs() > 0.01
        || params.vignette.abs() > 0.01;
    if !need_pass {
        return;
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();

    let exposure_mul = 2.0f32.powf(params.exposure);
    let temp_shift = params.temperature / 100.0 * 0.15;
    let tint_shift = params.tint / 100.0 * 0.10;
    let shadow_amount = params.shadows / 100.0 * 0.5;
    let highlight_amount = params.highlights / 100.0 * 0.5;
    let inv_gamma = 1.0 / params.gamma;
    let vignette_amount = params.vignette / 100.0;
    let do_gamma = (inv_gamma - 1.0).abs() > 0.01;
    let do_vignette = vignette_amount.abs() > 0.01;
    let brightness = params.brightness;
    let contrast = params.contrast;

    image
        .par_chunks_exact_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let mut r = pixel[0] as f32 / 255.0;
                let mut g = pixel[1] as f32 / 255.0;
                let mut b = pixel[2] as f32 / 255.0;

                r *= exposure_mul;
                g *= exposure_mul;
                b *= exposure_mul;

                r += temp_shift;
                b -= temp_shift;

                g += tint_shift;

                r *= brightness;
                g *= brightness;
                b *= brightness;

                r = (r - 0.5) * contrast + 0.5;
                g = (g - 0.5) * contrast + 0.5;
                b = (b - 0.5) * contrast + 0.5;

                let lum = (r * 0.2126 + g * 0.7152 + b * 0.0722).clamp(0.0, 1.0);
                let shadow_weight = (1.0 - lum) * (1.0 - lum);
                let highlight_weight = lum * lum;
                let tonal = shadow_amount * shadow_weight + highlight_amount * highlight_weight;
                r += tonal;
                g += tonal;
                b += tonal;

                if do_gamma {
                    r = r.clamp(0.0, 1.0).powf(inv_gamma);
                    g = g.clamp(0.0, 1.0).powf(inv_gamma);
                    b = b.clamp(0.0, 1.0).powf(inv_gamma);
                }

                if do_vignette {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    let dist = (dx * dx + dy * dy).sqrt() / max_dist;
                    let falloff = (1.0 - vignette_amount * dist * dist).max(0.0);
                    r *= falloff;
                    g *= falloff;
                    b *= falloff;
                }

                pixel[0] = (r.clamp(0.0, 1.0) * 255.0) as u8;
                pixel[1] = (g.clamp(0.0, 1.0) * 255.0) as u8;
                pixel[2] = (b.clamp(0.0, 1.0) * 255.0) as u8;
            }
        });
}

/// Scale chroma around the Rec.709 luma axis.
pub fn apply_saturation(image: &mut RgbaImage, params: &AdjustmentParams) {
    let saturation = params.saturation;
    if (saturation - 1.0).abs() <= 0.001 {
        return;
    }

    image.par_chunks_exact_mut(4).for_each(|pixel| {
        let r = pixel[0] as f32;
        let g = pixel[1] as f32;
        let b = pixel[2] as f32;
        let gray = r * 0.2126 + g * 0.7152 + b * 0.0722;
        pixel[0] = (gray + (r - gray) * saturation).clamp(0.0, 255.0) as u8;
        pixel[1] = (gray + (g - gray) * saturation).clamp(0.0, 255.0) as u8;
        pixel[2] = (gray + (b - gray) * saturation).clamp(0.0, 255.0) as u8;
    });
}

/// Local-contrast boost: push each channel away from its blurred
/// neighborhood by the clarity amount.
pub fn apply_clarity(image: &mut RgbaImage, params: &AdjustmentParams) {
    if params.clarity.abs() <= 0.5 {
        return;
    }
    let amount = params.clarity / 100.0;
    let blur_sigma = 2.0f32.max(image.width() as f32 / 120.0);
    let blurred = imageops::blur(image, blur_sigma);

    image
        .par_chunks_exact_mut(4)
        .zip(blurred.par_chunks_exact(4))
        .for_each(|(pixel, soft)| {
            for c in 0..3 {
                let diff = pixel[c] as f32 - soft[c] as f32;
                pixel[c] = (pixel[c] as f32 + diff * amount).clamp(0.0, 255.0) as u8;
            }
        });
}

/// Gaussian blur scaled from the 0-100 slider.
pub fn apply_blur(image: &mut RgbaImage, params: &AdjustmentParams) {
    if params.blur <= 0.5 {
        return;
    }
    let sigma = params.blur / 100.0 * 5.0 + 0.2;
    let blurred = imageops::blur(&*image, sigma);
    *image = blurred;
}

/// Unsharp-mask sharpening scaled from the 0-100 slider.
pub fn apply_sharpen(image: &mut RgbaImage, params: &AdjustmentParams) {
    if params.sharpen <= 0.5 {
        return;
    }
    let sigma = params.sharpen / 100.0 * 3.0 + 0.3;
    let sharpened = imageops::unsharpen(&*image, sigma, 0);
    *image = sharpened;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gray_image(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(16, 16, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_identity_params_clone_source() {
        let image = gray_image(120);
        let out = render_adjusted(&image, &AdjustmentParams::default());
        assert_eq!(out, image);
    }

    #[test]
    fn test_brightness_raises_values() {
        let image = gray_image(100);
        let params = AdjustmentParams {
            brightness: 1.5,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        assert_eq!(out.get_pixel(8, 8)[0], 150);
    }

    #[test]
    fn test_exposure_one_stop_doubles() {
        let image = gray_image(60);
        let params = AdjustmentParams {
            exposure: 1.0,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        let v = out.get_pixel(4, 4)[0];
        assert!((119..=121).contains(&v), "got {v}");
    }

    #[test]
    fn test_contrast_pivots_at_middle_gray() {
        let image = gray_image(128);
        let params = AdjustmentParams {
            contrast: 1.8,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        let v = out.get_pixel(4, 4)[0];
        assert!((126..=129).contains(&v), "middle gray moved to {v}");
    }

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let mut image = gray_image(0);
        image
            .pixels_mut()
            .for_each(|p| *p = Rgba([200, 40, 90, 255]));
        let params = AdjustmentParams {
            saturation: 0.0,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        let p = out.get_pixel(3, 3);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn test_temperature_warms_red_cools_blue() {
        let image = gray_image(128);
        let params = AdjustmentParams {
            temperature: 60.0,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        let p = out.get_pixel(8, 8);
        assert!(p[0] > p[2], "red {} should exceed blue {}", p[0], p[2]);
    }

    #[test]
    fn test_vignette_darkens_corners_only() {
        let image = gray_image(180);
        let params = AdjustmentParams {
            vignette: 80.0,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        let center = out.get_pixel(8, 8)[0];
        let corner = out.get_pixel(0, 0)[0];
        assert!(corner < center);
    }

    #[test]
    fn test_alpha_untouched_by_pixel_pass() {
        let mut image = gray_image(90);
        image.pixels_mut().for_each(|p| p[3] = 77);
        let params = AdjustmentParams {
            brightness: 1.4,
            vignette: 50.0,
            ..AdjustmentParams::default()
        };
        let out = render_adjusted(&image, &params);
        assert!(out.pixels().all(|p| p[3] == 77));
    }
}
