//! maskforge - Interactive image mask segmentation and refinement
//!
//! Given a raster image and either a neural confidence map or raw pixel
//! colors, maskforge produces a region selection (binary or soft-alpha
//! mask) usable to apply localized edits:
//!
//! - Model-guided selection: ONNX inference post-processed into a
//!   probability plane, then either a global subject mask or a
//!   single-click seeded growth
//! - Color-guided selection: flood fill by color similarity
//! - Refinement: shared morphology, boundary feathering
//! - Application: per-layer adjustments composited in layer order
//!
//! # Example
//!
//! ```
//! use maskforge::{Connectivity, Seed};
//! use maskforge::select::{ColorFillOptions, color_select};
//!
//! let image = image::RgbaImage::from_pixel(8, 8, image::Rgba([40, 90, 200, 255]));
//! let options = ColorFillOptions::new(12).with_connectivity(Connectivity::EightWay);
//! let mask = color_select(&image, Seed::new(4, 4), &options);
//! assert_eq!(mask.count_nonzero(), 64);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use maskforge_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use maskforge_engine as engine;
pub use maskforge_infer as infer;
pub use maskforge_morph as morph;
pub use maskforge_render as render;
pub use maskforge_select as select;
