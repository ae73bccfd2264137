//! maskforge-render - Feathering, adjustments and compositing
//!
//! This crate renders pixels:
//!
//! - **Boundary naturalizer** - hard mask → soft alpha ramp
//!   ([`naturalize_boundary`])
//! - **Adjustment pipeline** - fixed sequence of pure per-image steps
//!   ([`render_adjusted`])
//! - **Layer compositor** - ordered per-layer blending ([`composite`])

pub mod compose;
mod error;
pub mod feather;
pub mod pipeline;

pub use error::{RenderError, RenderResult};

pub use compose::{LayerRender, blend_by_mask, composite};
pub use feather::{box_blur, naturalize_boundary};
pub use pipeline::render_adjusted;
