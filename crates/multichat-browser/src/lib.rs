//! # MultiChat Browser Gateway
//!
//! The abstract asynchronous capability interface over the browser's
//! tab/window/display/scripting facilities. Every interaction with
//! the browser suspends and may fail; handlers consume the gateway
//! with ordinary sequential `await`/result-matching instead of
//! callbacks.
//!
//! [`mock::MockBrowser`] is an in-memory gateway used by the layout
//! and engine test suites.

pub mod error;
pub mod gateway;
pub mod mock;

pub use error::GatewayError;
pub use gateway::{
    BrowserGateway, CreateWindow, CreatedWindow, PageExtractor, TabGlow, TabInfo, WindowInfo,
    WindowKind, WindowUpdate,
};
pub use mock::MockBrowser;
