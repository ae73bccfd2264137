//! Engine facade
//!
//! Owns the session state (image, mask layers, global adjustments) behind
//! a single mutex, plus the throttling primitives and the model predictor.
//! All methods take `&self`: heavy computation runs on the calling (worker)
//! thread against cloned inputs, and results are swapped in under the lock
//! as completed buffers, never partially visible.

use std::path::Path;
use std::sync::Mutex;

use image::RgbaImage;
use tracing::{debug, info};

use maskforge_core::{AdjustmentValues, LayerSnapshot, Mask, MaskLayer, Seed};
use maskforge_infer::MaskPredictor;
use maskforge_render::{LayerRender, composite, naturalize_boundary};
use maskforge_select::{
    ColorFillOptions, build_global_mask, color_select, grow_from_seed, otsu_threshold,
};

use crate::apply::{ApplyMode, apply_selection, fill_polygon};
use crate::error::{EngineError, EngineResult};
use crate::scheduler::{BusyFlag, RenderScheduler};

struct EngineState {
    image: Option<RgbaImage>,
    layers: Vec<MaskLayer>,
    selected: Option<usize>,
    global_adjustments: AdjustmentValues,
    layer_counter: usize,
}

/// Interactive mask segmentation session.
pub struct Engine {
    state: Mutex<EngineState>,
    busy: BusyFlag,
    predictor: MaskPredictor,
    preview: RenderScheduler,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState {
                image: None,
                layers: Vec::new(),
                selected: None,
                global_adjustments: AdjustmentValues::default(),
                layer_counter: 0,
            }),
            busy: BusyFlag::new(),
            predictor: MaskPredictor::new(),
            preview: RenderScheduler::new(),
        }
    }

    /// Load a new image, discarding every layer of the previous session.
    pub fn load_image(&self, image: RgbaImage) {
        let mut state = self.lock();
        info!(width = image.width(), height = image.height(), "image loaded");
        state.image = Some(image);
        state.layers.clear();
        state.selected = None;
        state.layer_counter = 0;
    }

    /// Close the session: drop the image, layers, and the model session.
    pub fn close_session(&self) {
        let mut state = self.lock();
        state.image = None;
        state.layers.clear();
        state.selected = None;
        drop(state);
        self.predictor.close();
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.lock()
            .image
            .as_ref()
            .map(|image| (image.width(), image.height()))
    }

    /// True while a mask-producing operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    // ───────── layer management ─────────

    /// Add an empty layer sized to the image and select it.
    pub fn add_layer(&self) -> EngineResult<usize> {
        let mut state = self.lock();
        let (width, height) = image_dims(&state)?;
        state.layer_counter += 1;
        let name = format!("Mask {}", state.layer_counter);
        state.layers.push(MaskLayer::new(name, width, height)?);
        let index = state.layers.len() - 1;
        state.selected = Some(index);
        Ok(index)
    }

    pub fn remove_layer(&self, index: usize) -> EngineResult<()> {
        let mut state = self.lock();
        let count = state.layers.len();
        if index >= count {
            return Err(EngineError::LayerIndexOutOfRange { index, count });
        }
        state.layers.remove(index);
        state.selected = if state.layers.is_empty() {
            None
        } else {
            Some(index.min(state.layers.len() - 1))
        };
        Ok(())
    }

    pub fn select_layer(&self, index: usize) -> EngineResult<()> {
        let mut state = self.lock();
        let count = state.layers.len();
        if index >= count {
            return Err(EngineError::LayerIndexOutOfRange { index, count });
        }
        state.selected = Some(index);
        Ok(())
    }

    pub fn layer_count(&self) -> usize {
        self.lock().layers.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.lock().selected
    }

    /// Clone of the selected layer's mask, if any layer is selected.
    pub fn selected_mask(&self) -> Option<Mask> {
        let state = self.lock();
        selected_layer(&state).map(|layer| layer.mask().clone())
    }

    /// Selected fraction of the selected layer, in percent.
    pub fn coverage_percent(&self) -> f64 {
        let state = self.lock();
        selected_layer(&state).map_or(0.0, MaskLayer::coverage_percent)
    }

    pub fn clear_selected_mask(&self) -> EngineResult<bool> {
        let mut state = self.lock();
        let layer = selected_layer_mut(&mut state)?;
        if !layer.has_mask() {
            return Ok(false);
        }
        layer.clear();
        Ok(true)
    }

    pub fn invert_selected_mask(&self) -> EngineResult<bool> {
        let mut state = self.lock();
        let layer = selected_layer_mut(&mut state)?;
        let mut inverted = layer.mask().clone();
        inverted.binarize();
        inverted.invert();
        layer.set_mask(inverted);
        Ok(true)
    }

    pub fn rename_selected(&self, name: impl Into<String>) -> EngineResult<()> {
        let mut state = self.lock();
        selected_layer_mut(&mut state)?.set_name(name);
        Ok(())
    }

    pub fn set_global_adjustments(&self, adjustments: AdjustmentValues) {
        self.lock().global_adjustments = adjustments;
    }

    pub fn set_selected_adjustments(&self, adjustments: AdjustmentValues) -> EngineResult<()> {
        let mut state = self.lock();
        selected_layer_mut(&mut state)?.adjustments = adjustments;
        Ok(())
    }

    pub fn set_selected_naturalize(&self, naturalize: bool) -> EngineResult<()> {
        let mut state = self.lock();
        selected_layer_mut(&mut state)?.naturalize_boundary = naturalize;
        Ok(())
    }

    // ───────── history interop ─────────

    /// Snapshot of the selected layer for an external undo/redo store.
    pub fn snapshot_selected(&self) -> Option<LayerSnapshot> {
        let state = self.lock();
        selected_layer(&state).map(MaskLayer::snapshot)
    }

    /// Restore the selected layer from a snapshot. A malformed snapshot
    /// (buffer length vs dimensions) is rejected without touching the
    /// layer.
    pub fn restore_selected(&self, snapshot: &LayerSnapshot) -> EngineResult<()> {
        let restored = MaskLayer::from_snapshot(snapshot)?;
        let mut state = self.lock();
        let layer = selected_layer_mut(&mut state)?;
        *layer = restored;
        Ok(())
    }

    // ───────── selection operations ─────────

    /// Model-guided single-click selection.
    ///
    /// Rejected with `Ok(false)` while another operation is in flight.
    /// Returns whether the selected layer changed.
    pub fn auto_select_at(
        &self,
        model_path: &Path,
        seed: Seed,
        mode: ApplyMode,
        multi_pass: bool,
    ) -> EngineResult<bool> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("auto select rejected: engine busy");
            return Ok(false);
        };

        let image = self.cloned_image()?;
        let map = self.predictor.predict(&image, model_path, multi_pass)?;
        let otsu = otsu_threshold(&map);
        let selection = grow_from_seed(&map, seed, otsu);
        self.apply_to_selected(&selection, mode)
    }

    /// Model-guided whole-subject selection (no seed).
    pub fn auto_select_global(
        &self,
        model_path: &Path,
        mode: ApplyMode,
        multi_pass: bool,
    ) -> EngineResult<bool> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("global auto select rejected: engine busy");
            return Ok(false);
        };

        let image = self.cloned_image()?;
        let map = self.predictor.predict(&image, model_path, multi_pass)?;
        let otsu = otsu_threshold(&map);
        let selection = build_global_mask(&map, otsu);
        self.apply_to_selected(&selection, mode)
    }

    /// Color-similarity single-click selection.
    ///
    /// Rejected with `Ok(false)` while another operation is in flight.
    pub fn color_select_at(
        &self,
        seed: Seed,
        options: &ColorFillOptions,
        mode: ApplyMode,
    ) -> EngineResult<bool> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("color select rejected: engine busy");
            return Ok(false);
        };

        let image = self.cloned_image()?;
        let selection = color_select(&image, seed, options);
        self.apply_to_selected(&selection, mode)
    }

    /// Manual polygon (lasso) fill on the selected layer.
    pub fn fill_polygon_selected(
        &self,
        points: &[(f64, f64)],
        erase: bool,
    ) -> EngineResult<bool> {
        let mut state = self.lock();
        let (width, height) = image_dims(&state)?;
        let layer = ensure_selected_layer(&mut state, width, height)?;
        fill_polygon(layer, points, erase)
    }

    // ───────── rendering ─────────

    /// Composite the image through the global adjustments and every
    /// non-empty layer, in order.
    pub fn render_preview(&self) -> EngineResult<RgbaImage> {
        // Clone everything needed under the lock, render outside it.
        let (image, global, layer_inputs) = {
            let state = self.lock();
            let image = state.image.as_ref().ok_or(EngineError::NoImage)?.clone();
            let layer_inputs: Vec<(Mask, AdjustmentValues, bool)> = state
                .layers
                .iter()
                .filter(|layer| layer.has_mask())
                .map(|layer| {
                    (
                        layer.mask().clone(),
                        layer.adjustments,
                        layer.naturalize_boundary,
                    )
                })
                .collect();
            (image, state.global_adjustments, layer_inputs)
        };

        let renders: Vec<LayerRender<'_>> = layer_inputs
            .iter()
            .map(|(mask, adjustments, naturalize)| LayerRender {
                mask,
                params: adjustments.to_params(),
                naturalize: *naturalize,
            })
            .collect();

        Ok(composite(&image, &global.to_params(), &renders)?)
    }

    /// Coalesced preview: bursts of requests collapse into the in-flight
    /// render plus exactly one follow-up. Each completed frame is handed
    /// to `publish`.
    pub fn request_preview(&self, mut publish: impl FnMut(EngineResult<RgbaImage>)) {
        self.preview.request(|| publish(self.render_preview()));
    }

    /// Naturalized alpha mask of the selected layer, for callers that
    /// need the feathered ramp itself.
    pub fn naturalized_selected_mask(&self) -> Option<Mask> {
        self.selected_mask().map(|mask| naturalize_boundary(&mask))
    }

    // ───────── internals ─────────

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine mutex poisoned")
    }

    fn cloned_image(&self) -> EngineResult<RgbaImage> {
        self.lock()
            .image
            .as_ref()
            .cloned()
            .ok_or(EngineError::NoImage)
    }

    /// Apply a computed selection to the selected layer (creating one when
    /// none exists), reporting whether anything changed.
    fn apply_to_selected(&self, selection: &Mask, mode: ApplyMode) -> EngineResult<bool> {
        let mut state = self.lock();
        let (width, height) = image_dims(&state)?;
        let layer = ensure_selected_layer(&mut state, width, height)?;
        let changed = apply_selection(layer, selection, mode)?;
        if changed {
            debug!(
                non_zero = layer.non_zero_count(),
                coverage = layer.coverage_percent(),
                "selection applied"
            );
        }
        Ok(changed)
    }
}

fn image_dims(state: &EngineState) -> EngineResult<(u32, u32)> {
    state
        .image
        .as_ref()
        .map(|image| (image.width(), image.height()))
        .ok_or(EngineError::NoImage)
}

fn selected_layer(state: &EngineState) -> Option<&MaskLayer> {
    state.selected.and_then(|index| state.layers.get(index))
}

fn selected_layer_mut(state: &mut EngineState) -> EngineResult<&mut MaskLayer> {
    let index = state.selected.ok_or(EngineError::NoLayer)?;
    state.layers.get_mut(index).ok_or(EngineError::NoLayer)
}

/// Selected layer resized to the image dimensions, created on demand when
/// no layer exists yet.
fn ensure_selected_layer<'a>(
    state: &'a mut EngineState,
    width: u32,
    height: u32,
) -> EngineResult<&'a mut MaskLayer> {
    if state.selected.is_none() || state.layers.is_empty() {
        state.layer_counter += 1;
        let name = format!("Mask {}", state.layer_counter);
        state.layers.push(MaskLayer::new(name, width, height)?);
        state.selected = Some(state.layers.len() - 1);
    }

    let layer = selected_layer_mut(state)?;
    if layer.width() != width || layer.height() != height {
        layer.reset_size(width, height)?;
    }
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn engine_with_gray_image(width: u32, height: u32) -> Engine {
        let engine = Engine::new();
        engine.load_image(RgbaImage::from_pixel(
            width,
            height,
            Rgba([128, 128, 128, 255]),
        ));
        engine
    }

    #[test]
    fn test_add_layer_requires_image() {
        let engine = Engine::new();
        assert!(matches!(engine.add_layer(), Err(EngineError::NoImage)));
    }

    #[test]
    fn test_layer_lifecycle() {
        let engine = engine_with_gray_image(8, 8);
        let a = engine.add_layer().unwrap();
        let b = engine.add_layer().unwrap();
        assert_eq!(engine.layer_count(), 2);
        assert_eq!(engine.selected_index(), Some(b));

        engine.select_layer(a).unwrap();
        assert_eq!(engine.selected_index(), Some(a));

        engine.remove_layer(a).unwrap();
        assert_eq!(engine.layer_count(), 1);
        assert_eq!(engine.selected_index(), Some(0));

        engine.remove_layer(0).unwrap();
        assert_eq!(engine.selected_index(), None);
    }

    #[test]
    fn test_invert_and_coverage() {
        let engine = engine_with_gray_image(4, 4);
        engine.add_layer().unwrap();
        assert_eq!(engine.coverage_percent(), 0.0);

        engine.invert_selected_mask().unwrap();
        assert_eq!(engine.coverage_percent(), 100.0);

        engine.clear_selected_mask().unwrap();
        assert_eq!(engine.coverage_percent(), 0.0);
    }

    #[test]
    fn test_missing_model_surfaces_unavailable() {
        let engine = engine_with_gray_image(8, 8);
        let result = engine.auto_select_at(
            Path::new("/nonexistent/model.onnx"),
            Seed::new(4, 4),
            ApplyMode::Replace,
            false,
        );
        assert!(matches!(result, Err(EngineError::Infer(_))));
        // A failed operation leaves no half-applied layer state
        assert_eq!(engine.coverage_percent(), 0.0);
    }
}
