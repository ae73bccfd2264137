//! maskforge-core - Shared data structures for the maskforge engine
//!
//! This crate provides the fundamental types used throughout the maskforge
//! workspace:
//!
//! - [`Mask`] - Byte mask plane (binary {0,255} or soft alpha 0-255)
//! - [`ProbMap`] - Per-pixel model confidence in [0,1]
//! - [`Seed`] / [`Connectivity`] - Selection inputs
//! - [`MaskLayer`] / [`LayerSnapshot`] - Layer state and its opaque
//!   history-store form
//! - [`AdjustmentValues`] / [`AdjustmentParams`] - Per-layer adjustment
//!   controls in slider and renderer form

pub mod adjust;
pub mod error;
pub mod layer;
pub mod mask;
pub mod probmap;

pub use adjust::{AdjustmentParams, AdjustmentValues};
pub use error::{CoreError, CoreResult};
pub use layer::{LayerSnapshot, MaskLayer};
pub use mask::{Connectivity, MASK_OFF, MASK_ON, Mask, Seed};
pub use probmap::ProbMap;
