//! Error types for maskforge-core
//!
//! Provides a unified error type for the core data structures. Each variant
//! captures enough context for diagnostics without exposing internal
//! implementation details.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid plane dimensions
    #[error("invalid plane dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Buffer length does not match the declared dimensions
    #[error("shape mismatch: expected {}x{} ({} bytes), got {actual_len}", .expected.0, .expected.1, .expected.0 as usize * .expected.1 as usize)]
    ShapeMismatch {
        expected: (u32, u32),
        actual_len: usize,
    },

    /// Seed coordinate outside the plane
    #[error("invalid seed position: ({x}, {y})")]
    InvalidSeed { x: u32, y: u32 },
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
