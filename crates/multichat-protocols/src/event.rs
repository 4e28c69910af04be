//! Browser event stream consumed by the engine.
//!
//! These mirror the tab/window/navigation callbacks the browser
//! delivers. No ordering is guaranteed between differently-sourced
//! events; every consumer must treat them as an overlapping,
//! idempotent set of triggers.

use serde::{Deserialize, Serialize};

use crate::handles::{TabId, WindowId};

/// Frame identifier within a tab. The main frame is always zero.
pub const MAIN_FRAME: u32 = 0;

/// A single browser-delivered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserEvent {
    /// The user switched focus to a different tab.
    TabActivated { tab: TabId },

    /// A tab's load status changed. `complete` is true once the page
    /// finished loading.
    TabUpdated {
        tab: TabId,
        complete: bool,
        url: Option<String>,
    },

    /// A navigation is about to start in a frame of a tab.
    BeforeNavigate {
        tab: TabId,
        frame: u32,
        url: String,
    },

    /// A navigation finished in a frame of a tab.
    NavigationCompleted {
        tab: TabId,
        frame: u32,
        url: String,
    },

    /// A single-page-app history update (route change without a full
    /// navigation).
    HistoryStateUpdated {
        tab: TabId,
        frame: u32,
        url: String,
    },

    /// A tab was closed.
    TabRemoved { tab: TabId },

    /// A window was closed.
    WindowRemoved { window: WindowId },
}

impl BrowserEvent {
    /// Whether this event concerns the main frame (or is not
    /// frame-scoped at all).
    pub fn is_main_frame(&self) -> bool {
        match self {
            BrowserEvent::BeforeNavigate { frame, .. }
            | BrowserEvent::NavigationCompleted { frame, .. }
            | BrowserEvent::HistoryStateUpdated { frame, .. } => *frame == MAIN_FRAME,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_frame_check() {
        let main = BrowserEvent::BeforeNavigate {
            tab: TabId(1),
            frame: MAIN_FRAME,
            url: "https://example.com".to_string(),
        };
        let sub = BrowserEvent::NavigationCompleted {
            tab: TabId(1),
            frame: 3,
            url: "https://example.com/ad".to_string(),
        };
        assert!(main.is_main_frame());
        assert!(!sub.is_main_frame());
        assert!(BrowserEvent::TabActivated { tab: TabId(1) }.is_main_frame());
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = BrowserEvent::TabUpdated {
            tab: TabId(7),
            complete: true,
            url: Some("https://example.com".to_string()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("tab_updated"));
        let back: BrowserEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
