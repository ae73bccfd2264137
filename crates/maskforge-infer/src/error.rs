//! Error types for maskforge-infer

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during model inference
#[derive(Debug, Error)]
pub enum InferError {
    /// Model file missing or unreadable; the caller must resolve the model
    /// before retrying.
    #[error("model unavailable: {}", .path.display())]
    ModelUnavailable { path: PathBuf },

    /// The model produced no float tensor of compatible rank.
    #[error("no compatible output tensor in inference result")]
    OutputInvalid,

    /// ONNX Runtime error
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] maskforge_core::CoreError),
}

/// Result type for inference operations
pub type InferResult<T> = Result<T, InferError>;
