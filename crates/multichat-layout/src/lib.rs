//! # MultiChat Layout
//!
//! Window-tiling orchestration: resolving which display a window
//! lives on, partitioning work areas into service windows plus a
//! control popup, and keeping an existing layout consistent across
//! display changes.
//!
//! ## Components
//!
//! - [`display`] - Pure display-containment resolution
//! - [`partition`] - Pure work-area partition math
//! - [`manager`] - The stateful [`LayoutManager`]

pub mod display;
pub mod error;
pub mod manager;
pub mod partition;

pub use display::display_containing;
pub use error::LayoutError;
pub use manager::{CompanionPlacement, LayoutConfig, LayoutManager, SavedGeometry};
pub use partition::{bottom_slots, vertical_slots, LayoutSlots};
