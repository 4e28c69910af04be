//! The browser gateway trait and its data types.

use async_trait::async_trait;

use multichat_protocols::command::TabMessage;
use multichat_protocols::{Bounds, DisplayDescriptor, Rect, TabId, WindowId, WindowState};

use crate::error::GatewayError;

/// Snapshot of a tab's identity and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub window: WindowId,
    /// Absent while the tab is still being created.
    pub url: Option<String>,
    pub active: bool,
}

impl TabInfo {
    /// Whether the tab shows an ordinary web page. Settings pages,
    /// the new-tab page, and other privileged surfaces are not.
    pub fn is_web_page(&self) -> bool {
        self.url.as_deref().is_some_and(|url| url.starts_with("http"))
    }
}

/// Snapshot of a window's identity and geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub bounds: Bounds,
    pub state: WindowState,
}

/// Window flavor for creation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Normal,
    /// Chromeless window without tab strip or omnibox.
    Popup,
}

/// Request to create a window at a fixed position.
#[derive(Debug, Clone)]
pub struct CreateWindow {
    pub url: String,
    pub kind: WindowKind,
    pub bounds: Rect,
}

/// Handles returned by window creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedWindow {
    pub window: WindowId,
    /// The single tab the new window opened with.
    pub tab: TabId,
}

/// Partial geometry/state update for an existing window. Absent
/// fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowUpdate {
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub state: Option<WindowState>,
}

impl WindowUpdate {
    /// Move/resize to a rectangle and force the normal state, the
    /// shape every tiling operation uses.
    pub fn place(rect: Rect) -> Self {
        Self {
            left: Some(rect.left),
            top: Some(rect.top),
            width: Some(rect.width),
            height: Some(rect.height),
            state: Some(WindowState::Normal),
        }
    }
}

/// Asynchronous access to the browser's tabs, windows, and displays.
///
/// Every method may suspend the caller and every method may fail;
/// results must be revalidated against current state after any await
/// before mutating shared session state.
#[async_trait]
pub trait BrowserGateway: Send + Sync {
    /// Look up a single tab. Fails if the tab has closed.
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo, GatewayError>;

    /// The active tab of the current (last focused) window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, GatewayError>;

    /// Every open tab across all windows.
    async fn all_tabs(&self) -> Result<Vec<TabInfo>, GatewayError>;

    /// Open a background or foreground tab in the current window.
    async fn create_tab(&self, url: &str, active: bool) -> Result<TabId, GatewayError>;

    /// Create a window at a fixed position.
    async fn create_window(&self, request: CreateWindow) -> Result<CreatedWindow, GatewayError>;

    /// Look up a window. Fails if the window has closed.
    async fn window_info(&self, window: WindowId) -> Result<WindowInfo, GatewayError>;

    /// The most recently focused normal (non-popup) window.
    async fn last_focused_normal_window(&self) -> Result<Option<WindowInfo>, GatewayError>;

    /// Apply a partial geometry/state update to a window.
    async fn update_window(
        &self,
        window: WindowId,
        update: WindowUpdate,
    ) -> Result<(), GatewayError>;

    /// Close a window.
    async fn remove_window(&self, window: WindowId) -> Result<(), GatewayError>;

    /// Enumerate physical displays.
    async fn displays(&self) -> Result<Vec<DisplayDescriptor>, GatewayError>;

    /// Deliver a message to a tab's content script.
    async fn send_tab_message(&self, tab: TabId, message: TabMessage) -> Result<(), GatewayError>;
}

/// Extracts cleaned visible text from a tab, one result per frame.
///
/// `None` entries are frames that produced nothing. Failure (tab
/// closed, permission denied, injection blocked) is treated by
/// consumers identically to "no content".
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, tab: TabId) -> Result<Vec<Option<String>>, GatewayError>;
}

/// Best-effort visual indicator that a tab is being watched.
/// Failures (content script not yet loaded) are swallowed by callers.
#[async_trait]
pub trait TabGlow: Send + Sync {
    async fn enable(&self, tab: TabId) -> Result<(), GatewayError>;
    async fn disable(&self, tab: TabId) -> Result<(), GatewayError>;
}
