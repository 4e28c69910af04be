//! Companion session state.

use std::sync::Arc;

use tokio::sync::RwLock;

use multichat_config::CompanionSettings;
use multichat_layout::SavedGeometry;
use multichat_protocols::{ServiceKey, TabId, WindowId};

/// Shared slot holding the current session, empty while inactive.
/// The tracker is the single writer; the scheduler's deferred
/// attempts read it to revalidate themselves at fire time.
pub type SessionSlot = Arc<RwLock<Option<CompanionSession>>>;

/// The single active companion instance. At most one exists at a
/// time; starting a new one destroys the prior session first.
#[derive(Debug, Clone)]
pub struct CompanionSession {
    /// The popup window running the chat service.
    pub companion_window: WindowId,
    /// The control-panel strip above it. Destroyed together with the
    /// companion window.
    pub control_panel_window: WindowId,
    /// The tab inside the companion window. Never watched.
    pub companion_tab: TabId,
    pub service: ServiceKey,
    /// The tab whose content is being mirrored, if any.
    pub watched_tab: Option<TabId>,
    pub settings: CompanionSettings,
    /// Geometry of the browser window the companion displaced,
    /// restored on session end.
    pub saved_geometry: SavedGeometry,
}

impl CompanionSession {
    /// Whether a window belongs to this session.
    pub fn owns_window(&self, window: WindowId) -> bool {
        window == self.companion_window || window == self.control_panel_window
    }
}
