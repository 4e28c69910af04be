//! Browser gateway errors.

use thiserror::Error;

use multichat_protocols::{TabId, WindowId};

/// Errors surfaced by the browser gateway.
///
/// All of these are expected during normal operation (tabs close,
/// windows vanish, injection is blocked on privileged pages); callers
/// treat them as recoverable.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    #[error("Failed to create window: {0}")]
    CreateFailed(String),

    #[error("Failed to update window {window}: {message}")]
    UpdateFailed { window: WindowId, message: String },

    #[error("Failed to enumerate displays: {0}")]
    DisplayUnavailable(String),

    #[error("Script injection failed for {tab}: {message}")]
    InjectionFailed { tab: TabId, message: String },

    #[error("Message delivery failed for {tab}: {message}")]
    MessageFailed { tab: TabId, message: String },
}
