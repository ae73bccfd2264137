//! Selection application
//!
//! How a computed selection lands on a layer. All three modes operate on a
//! resized, binarized copy of the selection and report whether the layer
//! actually changed; a no-op application never dirties the layer.

use maskforge_core::{MASK_OFF, MASK_ON, Mask, MaskLayer};
use maskforge_morph::{dilate_n, merge_touching_components};
use tracing::debug;

use crate::error::EngineResult;

/// Iterations of dilation around the existing mask defining the merge
/// attachment zone.
const MERGE_ANCHOR_DILATIONS: u32 = 10;

/// How a new selection combines with the layer's existing mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Overwrite the layer with the selection.
    Replace,
    /// Union in only the selection components near the existing mask; a
    /// blank layer behaves as [`ApplyMode::Replace`].
    #[default]
    Merge,
    /// Clear layer pixels under the selection.
    Erase,
}

/// Apply a selection to a layer under the given mode.
///
/// The selection is resized (nearest) to the layer dimensions when needed
/// and binarized. Returns whether the layer changed.
pub fn apply_selection(
    layer: &mut MaskLayer,
    selection: &Mask,
    mode: ApplyMode,
) -> EngineResult<bool> {
    let mut selection = if selection.width() == layer.width()
        && selection.height() == layer.height()
    {
        selection.clone()
    } else {
        selection.resize_nearest(layer.width(), layer.height())?
    };
    selection.binarize();

    match mode {
        ApplyMode::Replace => Ok(replace(layer, selection)),
        ApplyMode::Erase => erase(layer, &selection),
        ApplyMode::Merge => {
            if layer.has_mask() {
                merge(layer, &selection)
            } else {
                Ok(replace(layer, selection))
            }
        }
    }
}

fn replace(layer: &mut MaskLayer, selection: Mask) -> bool {
    if layer.mask() == &selection {
        return false;
    }
    layer.set_mask(selection);
    true
}

fn erase(layer: &mut MaskLayer, selection: &Mask) -> EngineResult<bool> {
    let mut changed = false;
    for (idx, &v) in selection.data().iter().enumerate() {
        if v != MASK_OFF && layer.mask().data()[idx] != MASK_OFF {
            layer.set_pixel(idx, MASK_OFF)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Anchored merge: only selection components touching the dilated current
/// mask are unioned in, so a distant false positive cannot attach itself
/// to the existing selection.
fn merge(layer: &mut MaskLayer, selection: &Mask) -> EngineResult<bool> {
    let current = layer.mask();
    let mut merged = current.clone();
    let mut anchor = dilate_n(current, MERGE_ANCHOR_DILATIONS);
    merge_touching_components(&mut merged, &mut anchor, selection)?;

    if &merged == current {
        debug!("merge added no pixels near the existing selection");
        return Ok(false);
    }
    layer.set_mask(merged);
    Ok(true)
}

/// Even-odd scanline polygon fill into a layer.
///
/// Vertices are clamped into the layer, near-duplicate consecutive points
/// are dropped, and a closing duplicate of the first point is removed.
/// Returns whether any pixel changed. `erase` clears instead of sets.
pub fn fill_polygon(
    layer: &mut MaskLayer,
    points: &[(f64, f64)],
    erase: bool,
) -> EngineResult<bool> {
    let vertices = normalize_polygon_points(points, layer.width(), layer.height());
    if vertices.len() < 3 {
        return Ok(false);
    }

    let (mut min_y_value, mut max_y_value) = (vertices[0].1, vertices[0].1);
    for &(_, y) in &vertices[1..] {
        min_y_value = min_y_value.min(y);
        max_y_value = max_y_value.max(y);
    }

    let min_y = ((min_y_value - 1.0).floor().max(0.0)) as u32;
    let max_y = ((max_y_value + 1.0).ceil() as i64).min(layer.height() as i64 - 1);
    if max_y < min_y as i64 {
        return Ok(false);
    }

    let fill_value = if erase { MASK_OFF } else { MASK_ON };
    let width = layer.width() as usize;
    let mut changed = false;
    let mut intersections: Vec<f64> = Vec::with_capacity(vertices.len());

    for py in min_y..=max_y as u32 {
        intersections.clear();
        let scan_y = f64::from(py) + 0.5;

        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            let crosses = (a.1 <= scan_y && b.1 > scan_y) || (b.1 <= scan_y && a.1 > scan_y);
            if !crosses {
                continue;
            }
            let x = a.0 + (scan_y - a.1) * (b.0 - a.0) / (b.1 - a.1);
            intersections.push(x);
        }

        if intersections.len() < 2 {
            continue;
        }
        intersections.sort_by(|a, b| a.partial_cmp(b).expect("finite intersections"));

        for pair in intersections.chunks_exact(2) {
            let (left, right) = if pair[0] <= pair[1] {
                (pair[0], pair[1])
            } else {
                (pair[1], pair[0])
            };

            let min_x = ((left - 0.5).ceil().max(0.0)) as i64;
            let max_x = ((right - 0.5).floor() as i64).min(layer.width() as i64 - 1);
            if min_x > max_x {
                continue;
            }

            let row = py as usize * width;
            for px in min_x..=max_x {
                let idx = row + px as usize;
                if layer.mask().data()[idx] == fill_value {
                    continue;
                }
                layer.set_pixel(idx, fill_value)?;
                changed = true;
            }
        }
    }

    Ok(changed)
}

/// Clamp polygon points into the layer and drop near-duplicates.
fn normalize_polygon_points(points: &[(f64, f64)], width: u32, height: u32) -> Vec<(f64, f64)> {
    let mut normalized: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    if width == 0 || height == 0 {
        return normalized;
    }

    let max_x = f64::from(width - 1);
    let max_y = f64::from(height - 1);
    const MIN_DISTANCE_SQ: f64 = 0.25;

    for &(x, y) in points {
        let point = (x.clamp(0.0, max_x), y.clamp(0.0, max_y));
        match normalized.last() {
            None => normalized.push(point),
            Some(&(lx, ly)) => {
                let dx = point.0 - lx;
                let dy = point.1 - ly;
                if dx * dx + dy * dy >= MIN_DISTANCE_SQ {
                    normalized.push(point);
                }
            }
        }
    }

    if normalized.len() >= 3 {
        let first = normalized[0];
        let last = *normalized.last().expect("non-empty");
        let dx = first.0 - last.0;
        let dy = first.1 - last.1;
        if dx * dx + dy * dy < MIN_DISTANCE_SQ {
            normalized.pop();
        }
    }

    normalized
}
