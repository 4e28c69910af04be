//! # MultiChat Config
//!
//! The service catalog (which hosts count as which chat service, and
//! where to launch them) and the persisted user preferences.

pub mod catalog;
pub mod error;
pub mod prefs;

pub use catalog::{ServiceCatalog, ServiceEntry, DEFAULT_SERVICES};
pub use error::ConfigError;
pub use prefs::{CompanionSettings, Preferences, PreferencesStore};
