//! Model session management and prediction
//!
//! [`MaskPredictor`] owns at most one cached ONNX Runtime session, keyed by
//! model file path. The session opens lazily on first use, is reused while
//! the path stays the same, and is disposed and reopened when the path
//! changes. A single mutex guards the whole state; it is held across a run,
//! so one session is never used from two threads at once.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::ValueType;
use tracing::debug;

use maskforge_core::ProbMap;

use crate::error::{InferError, InferResult};
use crate::postprocess::{
    average_maps_in_place, mirror_horizontal_in_place, mirror_vertical_in_place,
    normalize_in_place, resize_bilinear,
};

/// Fallback model input size when the model declares dynamic spatial dims.
const DEFAULT_INPUT_SIZE: u32 = 320;

/// ImageNet channel means, the normalization most portrait/subject
/// segmentation models are trained with.
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations.
const STD: [f32; 3] = [0.229, 0.224, 0.225];

struct SessionState {
    session: Session,
    path: PathBuf,
    input_name: String,
    input_width: u32,
    input_height: u32,
}

/// Lazily opened, path-keyed ONNX session producing probability planes.
pub struct MaskPredictor {
    state: Mutex<Option<SessionState>>,
}

impl Default for MaskPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskPredictor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Run segmentation over an RGBA image and return a probability plane
    /// at the image's resolution.
    ///
    /// With `multi_pass` the model runs on the image and its three flips;
    /// the mirrored-back maps are averaged to reduce orientation bias.
    pub fn predict(
        &self,
        image: &RgbaImage,
        model_path: &Path,
        multi_pass: bool,
    ) -> InferResult<ProbMap> {
        if !model_path.is_file() {
            return Err(InferError::ModelUnavailable {
                path: model_path.to_path_buf(),
            });
        }

        let mut guard = self.state.lock().expect("predictor mutex poisoned");
        let state = ensure_session(&mut guard, model_path)?;

        let width = image.width() as usize;
        let height = image.height() as usize;

        let mut map = run_model(state, image)?;
        if multi_pass {
            let flipped_h = imageops::flip_horizontal(image);
            let mut map_h = run_model(state, &flipped_h)?;
            mirror_horizontal_in_place(&mut map_h, width, height);

            let flipped_v = imageops::flip_vertical(image);
            let mut map_v = run_model(state, &flipped_v)?;
            mirror_vertical_in_place(&mut map_v, width, height);

            let flipped_hv = imageops::flip_vertical(&flipped_h);
            let mut map_hv = run_model(state, &flipped_hv)?;
            mirror_horizontal_in_place(&mut map_hv, width, height);
            mirror_vertical_in_place(&mut map_hv, width, height);

            average_maps_in_place(&mut map, [&map_h, &map_v, &map_hv]);
        }

        Ok(ProbMap::from_vec(image.width(), image.height(), map)?)
    }

    /// Dispose the cached session, if any. The next predict reopens it.
    pub fn close(&self) {
        let mut guard = self.state.lock().expect("predictor mutex poisoned");
        if guard.take().is_some() {
            debug!("segmentation session disposed");
        }
    }
}

/// Open the session for `model_path`, reusing the cached one when the path
/// matches.
fn ensure_session<'a>(
    slot: &'a mut Option<SessionState>,
    model_path: &Path,
) -> InferResult<&'a mut SessionState> {
    let reusable = matches!(slot, Some(state) if state.path == model_path);
    if !reusable {
        if slot.take().is_some() {
            debug!(path = %model_path.display(), "model path changed, reopening session");
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        let input = session.inputs.first().ok_or(InferError::OutputInvalid)?;
        let input_name = input.name.clone();
        let (input_width, input_height) = resolve_input_size(&input.input_type);
        debug!(
            path = %model_path.display(),
            input = %input_name,
            width = input_width,
            height = input_height,
            "segmentation session opened"
        );

        *slot = Some(SessionState {
            session,
            path: model_path.to_path_buf(),
            input_name,
            input_width,
            input_height,
        });
    }

    Ok(slot.as_mut().expect("session state present"))
}

/// Spatial input size from the model's input metadata: the trailing two
/// dims of a rank-4 tensor, with a fixed fallback for dynamic dims.
fn resolve_input_size(input_type: &ValueType) -> (u32, u32) {
    let mut width = DEFAULT_INPUT_SIZE;
    let mut height = DEFAULT_INPUT_SIZE;

    if let ValueType::Tensor { shape, .. } = input_type {
        let dims: Vec<i64> = shape.iter().copied().collect();
        if dims.len() >= 4 {
            let h = dims[dims.len() - 2];
            let w = dims[dims.len() - 1];
            if h > 0 {
                height = h as u32;
            }
            if w > 0 {
                width = w as u32;
            }
        }
    }

    (width, height)
}

/// One forward pass: preprocess, run, extract the output plane at the
/// source resolution.
fn run_model(state: &mut SessionState, image: &RgbaImage) -> InferResult<Vec<f32>> {
    let tensor = build_input_tensor(image, state.input_width, state.input_height);
    let input_value = ort::value::Tensor::from_array(tensor)?;
    let outputs = state
        .session
        .run(ort::inputs![state.input_name.as_str() => input_value])?;

    // First float tensor of rank >= 2 wins; its leading H×W plane is the
    // probability surface.
    for (_, value) in outputs.iter() {
        let Ok(array) = value.try_extract_array::<f32>() else {
            continue;
        };

        let shape = array.shape().to_vec();
        if shape.len() < 2 {
            continue;
        }
        let (map_height, map_width) = if shape.len() >= 3 {
            (shape[shape.len() - 2], shape[shape.len() - 1])
        } else {
            (shape[0], shape[1])
        };
        if map_height == 0 || map_width == 0 {
            continue;
        }

        let stride = map_height * map_width;
        let plane: Vec<f32> = array.iter().copied().take(stride).collect();
        if plane.len() < stride {
            continue;
        }

        return Ok(postprocess_plane(
            plane,
            map_width,
            map_height,
            image.width() as usize,
            image.height() as usize,
        ));
    }

    Err(InferError::OutputInvalid)
}

/// Normalize an extracted plane and upscale it to the source resolution.
fn postprocess_plane(
    mut plane: Vec<f32>,
    map_width: usize,
    map_height: usize,
    out_width: usize,
    out_height: usize,
) -> Vec<f32> {
    normalize_in_place(&mut plane);
    resize_bilinear(&plane, map_width, map_height, out_width, out_height)
}

/// Resize to the model input size (bicubic, stretch) and normalize with
/// ImageNet statistics into a CHW float tensor.
fn build_input_tensor(image: &RgbaImage, target_width: u32, target_height: u32) -> Array4<f32> {
    let resized = imageops::resize(image, target_width, target_height, FilterType::CatmullRom);

    let mut tensor = Array4::<f32>::zeros((
        1,
        3,
        target_height as usize,
        target_width as usize,
    ));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (v - MEAN[c]) / STD[c];
        }
    }

    tensor
}
