//! maskforge-select - Selection algorithms for the maskforge engine
//!
//! This crate turns probability planes and raw pixels into mask planes:
//!
//! - **Otsu threshold** - automatic split point over a probability plane
//! - **Global mask builder** - unseeded whole-subject selection
//! - **Seeded region grower** - single-click selection with hysteresis
//!   growth and bounded connectivity expansion
//! - **Color flood fill** - single-click selection by color similarity
//!
//! Selection never fails into an error for "nothing there": a seed that
//! cannot support a selection produces an empty mask and callers treat
//! that as "nothing selected".

pub mod colorfill;
pub mod global;
pub mod grow;
pub mod threshold;

pub use colorfill::{ColorFillOptions, color_select};
pub use global::build_global_mask;
pub use grow::grow_from_seed;
pub use threshold::{OTSU_MAX, OTSU_MIN, otsu_threshold, threshold_map};
