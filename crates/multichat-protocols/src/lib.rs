//! # MultiChat Protocols
//!
//! Shared contract types for the MultiChat companion/tiling engine.
//!
//! ## Components
//!
//! - [`handles`] - Browser-assigned identity newtypes (tabs, windows, displays)
//! - [`geometry`] - Screen-coordinate rectangles and display descriptors
//! - [`event`] - Browser event stream consumed by the engine
//! - [`command`] - The message-based command surface exposed by the engine
//! - [`notify`] - Fire-and-forget notifications emitted to UI surfaces

pub mod command;
pub mod event;
pub mod geometry;
pub mod handles;
pub mod notify;

pub use command::{Command, CommandReply, StartMode, TabMessage};
pub use event::BrowserEvent;
pub use geometry::{Bounds, DisplayDescriptor, Rect, WindowState};
pub use handles::{DisplayId, ServiceKey, TabId, WindowId};
pub use notify::{FeedbackStatus, LayoutKind, Notification};
