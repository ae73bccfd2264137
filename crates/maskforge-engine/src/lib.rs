//! maskforge-engine - Session facade for the maskforge workspace
//!
//! This crate ties the selection algorithms, inference, and rendering
//! together into one interactive session object:
//!
//! - [`Engine`] - image + layer store with single-writer discipline
//! - [`ApplyMode`] - how selections land on a layer (replace/merge/erase)
//! - [`BusyFlag`] / [`RenderScheduler`] - cooperative throttling: one
//!   mask-producing operation in flight, preview bursts coalesced into a
//!   single follow-up render
//!
//! The engine never serializes anything; layer snapshots are opaque values
//! handed to an external undo/redo history store.

pub mod apply;
mod error;
pub mod engine;
pub mod scheduler;

pub use apply::{ApplyMode, apply_selection, fill_polygon};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use scheduler::{BusyFlag, BusyGuard, RenderScheduler};
