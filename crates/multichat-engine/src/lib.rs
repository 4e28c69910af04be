//! # MultiChat Engine
//!
//! The orchestration core: companion-mode content synchronization and
//! multi-window tiling, driven entirely by browser events and UI
//! commands.
//!
//! ## Components
//!
//! - [`extract`] - Frame joining and word-budget truncation
//! - [`cache`] - The single-slot page content cache
//! - [`registry`] - Which tabs run which chat service
//! - [`scheduler`] - Delayed, self-validating extraction attempts
//! - [`session`] - Companion session state
//! - [`tracker`] - The active-tab state machine
//! - [`controller`] - Command dispatch and event fan-out
//!
//! The engine talks to the browser exclusively through the capability
//! traits in `multichat-browser`, which makes every behavior testable
//! against the in-memory mock with a paused clock.

pub mod cache;
pub mod controller;
pub mod error;
pub mod extract;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod tracker;

pub use cache::ContentCache;
pub use controller::Controller;
pub use error::EngineError;
pub use registry::ServiceTabRegistry;
pub use scheduler::CacheScheduler;
pub use session::{CompanionSession, SessionSlot};
pub use tracker::ActiveTabTracker;
