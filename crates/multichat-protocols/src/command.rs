//! The message-based command surface exposed by the engine.

use serde::{Deserialize, Serialize};

use crate::handles::{ServiceKey, TabId};
use crate::notify::LayoutKind;

/// A command from a UI surface (popup, control panel, keyboard
/// shortcut) to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start companion mode with the given chat service.
    StartCompanionMode { service: ServiceKey },

    /// Swap the companion window to a different chat service,
    /// preserving settings and the watched tab.
    SwitchCompanionService { service: ServiceKey },

    /// Update companion settings (e.g. toggling context copying).
    UpdateCompanionSettings { settings: CompanionSettingsUpdate },

    /// Read the currently cached page content.
    GetCachedContent,

    /// Re-extract content from the watched tab on demand.
    RefreshPageContent,

    /// Open the given services, optionally tiled.
    OpenServices {
        targets: Vec<ServiceKey>,
        should_tile: bool,
        is_bottom_layout: bool,
    },

    /// Re-tile with an updated service selection.
    AutoRetile {
        targets: Vec<ServiceKey>,
        layout: LayoutKind,
    },

    /// Re-resolve displays and reapply the recorded layout.
    RaiseAndRetile,

    /// Open the standalone control popup near the bottom-right corner
    /// of the primary display.
    OpenControlPopup,

    /// Rebuild the bottom layout with an updated service selection.
    RetileBottomWindows { targets: Vec<ServiceKey> },

    /// Send a prompt to every registered tab of each target service.
    BroadcastPrompt {
        text: String,
        targets: Vec<ServiceKey>,
    },

    /// Mirror in-progress prompt text into every registered tab of
    /// each target service without submitting it.
    SyncPromptText {
        text: String,
        targets: Vec<ServiceKey>,
    },

    /// Re-send the last broadcast prompt.
    ReplayLast { targets: Vec<ServiceKey> },

    /// A content script announced that a tab is running a service.
    RegisterService { service: ServiceKey, tab: TabId },

    /// The user's text selection changed in a tab. Selected text is
    /// appended to the cached page content for the watched tab.
    UpdateSelection { tab: TabId, text: String },

    /// Ask for a status broadcast (registry contents + last prompt).
    RequestStatus,

    /// Start one of the preset modes using persisted preferences.
    StartMode { mode: StartMode },
}

/// Partial companion settings carried by
/// [`Command::UpdateCompanionSettings`]. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

/// Preset launch modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Companion with the preferred default service.
    Companion,
    /// Bottom tiling with the last checked services.
    Bottom,
    /// Vertical tiling with the last checked services.
    Vertical,
}

/// Reply to a command, where one is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandReply {
    /// Command accepted; nothing to return.
    Ack,

    /// Command could not be applied.
    Rejected { reason: String },

    /// Cached page content snapshot.
    CachedContent {
        content: Option<String>,
        url: Option<String>,
    },
}

/// A message delivered into a tab's content script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabMessage {
    /// Insert text into the service's input and submit it.
    InjectAndSend { text: String, service: ServiceKey },

    /// Insert text without submitting (live mirror).
    InjectTextRealtime { text: String, service: ServiceKey },

    /// Mark the tab as the companion's own chat tab.
    MarkAsCompanion { service: ServiceKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_tagging() {
        let cmd = Command::OpenServices {
            targets: vec![ServiceKey::from("chatgpt")],
            should_tile: true,
            is_bottom_layout: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("open_services"));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_settings_update_partial() {
        let json = r#"{"copy_context": false}"#;
        let update: CompanionSettingsUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.copy_context, Some(false));
        assert_eq!(update.is_expanded, None);
    }

    #[test]
    fn test_reply_cached_content() {
        let reply = CommandReply::CachedContent {
            content: None,
            url: None,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("cached_content"));
    }
}
