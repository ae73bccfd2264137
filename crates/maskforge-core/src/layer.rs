//! Mask layers
//!
//! A [`MaskLayer`] owns one mask plane, an independent adjustment set, and a
//! boundary-naturalization flag. The cached non-zero count is kept
//! consistent with every mutation so coverage queries never rescan the
//! buffer. [`LayerSnapshot`] is the opaque state handed to an external
//! undo/redo store.

use crate::adjust::AdjustmentValues;
use crate::error::{CoreError, CoreResult};
use crate::mask::{MASK_OFF, Mask};

/// One selection layer: mask, adjustments, naturalization flag.
#[derive(Debug, Clone)]
pub struct MaskLayer {
    name: String,
    mask: Mask,
    non_zero: usize,
    pub adjustments: AdjustmentValues,
    pub naturalize_boundary: bool,
}

impl MaskLayer {
    /// Create an empty layer of the given size.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> CoreResult<Self> {
        Ok(Self {
            name: name.into(),
            mask: Mask::new(width.max(1), height.max(1))?,
            non_zero: 0,
            adjustments: AdjustmentValues::default(),
            naturalize_boundary: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn non_zero_count(&self) -> usize {
        self.non_zero
    }

    /// True when at least one pixel is selected.
    pub fn has_mask(&self) -> bool {
        self.non_zero > 0
    }

    /// Selected fraction of the layer, in percent.
    pub fn coverage_percent(&self) -> f64 {
        self.non_zero as f64 * 100.0 / self.mask.len() as f64
    }

    /// Clear every pixel.
    pub fn clear(&mut self) {
        self.mask.data_mut().fill(MASK_OFF);
        self.non_zero = 0;
    }

    /// Replace the whole mask. The incoming mask keeps its own dimensions;
    /// the cached count is recomputed once here.
    pub fn set_mask(&mut self, mask: Mask) {
        self.non_zero = mask.count_nonzero();
        self.mask = mask;
    }

    /// Replace the whole mask from a raw buffer, shape-checked against the
    /// declared dimensions.
    pub fn set_mask_data(&mut self, width: u32, height: u32, data: Vec<u8>) -> CoreResult<()> {
        self.set_mask(Mask::from_vec(width, height, data)?);
        Ok(())
    }

    /// Write a single pixel, maintaining the non-zero count.
    pub fn set_pixel(&mut self, index: usize, value: u8) -> CoreResult<()> {
        let dims = (self.mask.width(), self.mask.height());
        let data = self.mask.data_mut();
        let old = *data.get(index).ok_or(CoreError::ShapeMismatch {
            expected: dims,
            actual_len: index,
        })?;
        if old == value {
            return Ok(());
        }
        data[index] = value;
        if old == 0 && value > 0 {
            self.non_zero += 1;
        } else if old > 0 && value == 0 {
            self.non_zero -= 1;
        }
        Ok(())
    }

    /// Discard the mask and reallocate at a new size (e.g. after the image
    /// was rotated or cropped).
    pub fn reset_size(&mut self, width: u32, height: u32) -> CoreResult<()> {
        self.mask = Mask::new(width.max(1), height.max(1))?;
        self.non_zero = 0;
        Ok(())
    }

    /// Clone the full layer state for an external history store.
    pub fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot {
            name: self.name.clone(),
            width: self.mask.width(),
            height: self.mask.height(),
            mask_data: self.mask.data().to_vec(),
            non_zero: self.non_zero,
            adjustments: self.adjustments,
            naturalize_boundary: self.naturalize_boundary,
        }
    }

    /// Rebuild a layer from a snapshot. The stored non-zero count is
    /// validated against the buffer; a stale count is recomputed.
    pub fn from_snapshot(state: &LayerSnapshot) -> CoreResult<Self> {
        let mask = Mask::from_vec(state.width, state.height, state.mask_data.clone())?;
        let true_count = mask.count_nonzero();
        Ok(Self {
            name: state.name.clone(),
            non_zero: if state.non_zero == true_count {
                state.non_zero
            } else {
                true_count
            },
            mask,
            adjustments: state.adjustments,
            naturalize_boundary: state.naturalize_boundary,
        })
    }
}

/// Opaque layer state for the external undo/redo history. The engine
/// produces and consumes these; it never serializes them.
#[derive(Debug, Clone)]
pub struct LayerSnapshot {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub mask_data: Vec<u8>,
    pub non_zero: usize,
    pub adjustments: AdjustmentValues,
    pub naturalize_boundary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MASK_ON;

    #[test]
    fn test_new_layer_is_empty() {
        let layer = MaskLayer::new("mask 1", 8, 6).unwrap();
        assert!(!layer.has_mask());
        assert_eq!(layer.coverage_percent(), 0.0);
    }

    #[test]
    fn test_set_pixel_maintains_count() {
        let mut layer = MaskLayer::new("mask 1", 4, 4).unwrap();
        layer.set_pixel(3, MASK_ON).unwrap();
        layer.set_pixel(5, MASK_ON).unwrap();
        assert_eq!(layer.non_zero_count(), 2);
        // Same value again must not double-count
        layer.set_pixel(3, MASK_ON).unwrap();
        assert_eq!(layer.non_zero_count(), 2);
        layer.set_pixel(3, MASK_OFF).unwrap();
        assert_eq!(layer.non_zero_count(), 1);
        assert_eq!(layer.non_zero_count(), layer.mask().count_nonzero());
    }

    #[test]
    fn test_set_mask_recounts() {
        let mut layer = MaskLayer::new("mask 1", 2, 2).unwrap();
        layer.set_mask(Mask::from_vec(2, 2, vec![0, 255, 128, 0]).unwrap());
        assert_eq!(layer.non_zero_count(), 2);
        assert!((layer.coverage_percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_mask_data_shape_mismatch() {
        let mut layer = MaskLayer::new("mask 1", 2, 2).unwrap();
        let result = layer.set_mask_data(2, 2, vec![0; 5]);
        assert!(result.is_err());
        // The committed mask stays untouched
        assert_eq!(layer.mask().len(), 4);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut layer = MaskLayer::new("hair", 3, 3).unwrap();
        layer.set_pixel(4, MASK_ON).unwrap();
        layer.naturalize_boundary = true;
        layer.adjustments.brightness = 25.0;

        let snap = layer.snapshot();
        let restored = MaskLayer::from_snapshot(&snap).unwrap();
        assert_eq!(restored.name(), "hair");
        assert_eq!(restored.non_zero_count(), 1);
        assert!(restored.naturalize_boundary);
        assert_eq!(restored.adjustments.brightness, 25.0);
        assert_eq!(restored.mask().data(), layer.mask().data());
    }

    #[test]
    fn test_from_snapshot_fixes_stale_count() {
        let snap = LayerSnapshot {
            name: "m".into(),
            width: 2,
            height: 2,
            mask_data: vec![255, 0, 0, 255],
            non_zero: 99,
            adjustments: AdjustmentValues::default(),
            naturalize_boundary: false,
        };
        let layer = MaskLayer::from_snapshot(&snap).unwrap();
        assert_eq!(layer.non_zero_count(), 2);
    }
}
