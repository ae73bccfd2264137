//! Error types for maskforge-render

use thiserror::Error;

/// Errors that can occur during rendering
#[derive(Debug, Error)]
pub enum RenderError {
    /// Mask plane does not match the image dimensions
    #[error("mask does not match image: mask {mask_len} pixels, image {width}x{height}")]
    MaskMismatch {
        mask_len: usize,
        width: u32,
        height: u32,
    },
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
