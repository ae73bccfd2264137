//! Mask blending and layer compositing
//!
//! The compositor renders the image once with the global adjustment
//! parameters, then walks the mask layers in order: each non-empty layer
//! renders a fully-adjusted copy of the current result and blends it in
//! through the layer's mask. Later layers see the output of earlier ones.

use image::RgbaImage;
use maskforge_core::{AdjustmentParams, Mask};

use crate::error::{RenderError, RenderResult};
use crate::feather::naturalize_boundary;
use crate::pipeline::render_adjusted;

/// One layer's contribution to a composite pass.
#[derive(Debug, Clone)]
pub struct LayerRender<'a> {
    /// Blend weight per pixel; 255 → fully adjusted, 0 → unchanged.
    pub mask: &'a Mask,
    /// Adjustments applied to this layer's region.
    pub params: AdjustmentParams,
    /// Feather the mask before blending.
    pub naturalize: bool,
}

/// Blend `adjusted` over `original` in place, weighted by the mask.
///
/// Every channel, including alpha, is linearly interpolated with
/// `mask/255`. When `naturalize` is set, the feathered alpha ramp is used
/// in place of the raw mask values.
pub fn blend_by_mask(
    original: &RgbaImage,
    adjusted: &mut RgbaImage,
    mask: &Mask,
    naturalize: bool,
) -> RenderResult<()> {
    let width = adjusted.width();
    let height = adjusted.height();
    let pixel_count = width as usize * height as usize;
    if mask.len() != pixel_count || original.len() != adjusted.len() {
        return Err(RenderError::MaskMismatch {
            mask_len: mask.len(),
            width,
            height,
        });
    }

    let naturalized;
    let weights = if naturalize {
        naturalized = naturalize_boundary(mask);
        naturalized.data()
    } else {
        mask.data()
    };

    let src: &[u8] = original;
    let dst: &mut [u8] = adjusted;

    for (i, &weight) in weights.iter().enumerate() {
        if weight == 255 {
            continue;
        }
        let p = i * 4;
        if weight == 0 {
            dst[p..p + 4].copy_from_slice(&src[p..p + 4]);
            continue;
        }

        let t = weight as f32 / 255.0;
        for c in 0..4 {
            let a = src[p + c] as f32;
            let b = dst[p + c] as f32;
            dst[p + c] = (a + (b - a) * t).clamp(0.0, 255.0) as u8;
        }
    }

    Ok(())
}

/// Render the image through the global parameters and every layer in
/// order.
pub fn composite(
    source: &RgbaImage,
    global: &AdjustmentParams,
    layers: &[LayerRender<'_>],
) -> RenderResult<RgbaImage> {
    let mut current = render_adjusted(source, global);

    for layer in layers {
        let mut adjusted = render_adjusted(&current, &layer.params);
        blend_by_mask(&current, &mut adjusted, layer.mask, layer.naturalize)?;
        current = adjusted;
    }

    Ok(current)
}
