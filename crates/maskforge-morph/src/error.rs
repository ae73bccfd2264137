//! Error types for maskforge-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
    /// Operands have different plane sizes
    #[error("plane size mismatch: {expected} vs {actual} pixels")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
