//! Fire-and-forget notifications emitted to listening UI surfaces.
//!
//! Absence of a listener is never an error; senders ignore delivery
//! failures.

use serde::{Deserialize, Serialize};

use crate::handles::{ServiceKey, TabId};

/// Tiled layout kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Service windows side by side, control popup in a right strip.
    Vertical,
    /// Service windows side by side, control popup in a bottom strip.
    Bottom,
}

/// Delivery outcome of a prompt sent to a service tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Sent,
    Error,
}

/// A notification pushed to whatever UI surface is listening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Registry contents changed (or were requested). Every known
    /// service appears, with an empty tab list when none are open.
    StatusUpdate {
        services: Vec<(ServiceKey, Vec<TabId>)>,
        last_prompt: String,
    },

    /// The companion's content cache changed.
    ContentCacheUpdated {
        has_content: bool,
        preview: Option<String>,
        url: Option<String>,
        word_count: usize,
    },

    /// The last tiled window (or the control popup) closed.
    TilingModeEnded,

    /// Outcome of delivering a prompt to one service tab.
    ServiceFeedback {
        service: ServiceKey,
        tab: Option<TabId>,
        status: FeedbackStatus,
        error: Option<String>,
    },
}
