//! maskforge-infer - Segmentation model inference for maskforge
//!
//! This crate runs a pre-trained segmentation network over an RGBA image
//! and post-processes the raw output into a [`maskforge_core::ProbMap`] at
//! the source resolution:
//!
//! - [`MaskPredictor`] - lazily opened, path-keyed ONNX session with an
//!   explicit open/close lifetime
//! - Post-processing - min-max normalization, corner-aligned bilinear
//!   upscale, flip-augmented multi-pass averaging
//!
//! The crate treats the model as an opaque probability surface; selecting
//! and refining masks from it happens in `maskforge-select`.

mod error;
pub mod postprocess;
pub mod session;

pub use error::{InferError, InferResult};
pub use session::MaskPredictor;
