//! Error types for maskforge-engine

use thiserror::Error;

/// Errors that can occur at the engine facade
#[derive(Debug, Error)]
pub enum EngineError {
    /// No image has been loaded into the session
    #[error("no image loaded")]
    NoImage,

    /// No mask layer exists or is selected
    #[error("no mask layer selected")]
    NoLayer,

    /// Layer index outside the current layer list
    #[error("layer index {index} out of range (count {count})")]
    LayerIndexOutOfRange { index: usize, count: usize },

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] maskforge_core::CoreError),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] maskforge_morph::MorphError),

    /// Inference error
    #[error("inference error: {0}")]
    Infer(#[from] maskforge_infer::InferError),

    /// Rendering error
    #[error("render error: {0}")]
    Render(#[from] maskforge_render::RenderError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
