//! In-memory browser gateway for tests.
//!
//! `MockBrowser` implements [`BrowserGateway`], [`PageExtractor`] and
//! [`TabGlow`] over plain maps so engine and layout behavior can be
//! exercised without a real browser. Mutators never emit events; the
//! test drives the event stream explicitly, which is exactly how the
//! racy interleavings under test are constructed.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use multichat_protocols::command::TabMessage;
use multichat_protocols::{
    Bounds, DisplayDescriptor, DisplayId, Rect, TabId, WindowId, WindowState,
};

use crate::error::GatewayError;
use crate::gateway::{
    BrowserGateway, CreateWindow, CreatedWindow, PageExtractor, TabGlow, TabInfo, WindowInfo,
    WindowKind,
};

#[derive(Debug, Clone)]
struct MockTab {
    window: WindowId,
    url: Option<String>,
}

#[derive(Debug, Clone)]
struct MockWindow {
    bounds: Bounds,
    state: WindowState,
    kind: WindowKind,
}

#[derive(Default)]
struct MockState {
    tabs: BTreeMap<TabId, MockTab>,
    windows: BTreeMap<WindowId, MockWindow>,
    displays: Vec<DisplayDescriptor>,
    active_tab: Option<TabId>,
    focused_normal: Option<WindowId>,
    next_tab: u64,
    next_window: u64,
    page_frames: BTreeMap<TabId, Vec<Option<String>>>,
    failing_extractions: HashSet<TabId>,
    fail_window_updates: bool,
    sent_messages: Vec<(TabId, TabMessage)>,
    glowing: HashSet<TabId>,
}

/// In-memory gateway. Cheap to clone; all clones share state.
#[derive(Clone, Default)]
pub struct MockBrowser {
    state: Arc<Mutex<MockState>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a display; the first added display is the primary one.
    pub fn add_display(&self, id: &str, work_area: Rect) {
        self.state.lock().displays.push(DisplayDescriptor {
            id: DisplayId::new(id),
            work_area,
        });
    }

    /// Open a normal browser window and mark it as the last focused
    /// normal window.
    pub fn open_normal_window(&self, bounds: Rect) -> WindowId {
        let mut state = self.state.lock();
        let id = WindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(
            id,
            MockWindow {
                bounds: Bounds::from(bounds),
                state: WindowState::Normal,
                kind: WindowKind::Normal,
            },
        );
        state.focused_normal = Some(id);
        id
    }

    /// Open a tab inside an existing window.
    pub fn open_tab(&self, window: WindowId, url: &str) -> TabId {
        let mut state = self.state.lock();
        let id = TabId(state.next_tab);
        state.next_tab += 1;
        state.tabs.insert(
            id,
            MockTab {
                window,
                url: Some(url.to_string()),
            },
        );
        id
    }

    /// Mark a tab as the browser's active tab.
    pub fn activate_tab(&self, tab: TabId) {
        self.state.lock().active_tab = Some(tab);
    }

    /// Change a tab's URL (simulating a navigation having happened).
    pub fn set_tab_url(&self, tab: TabId, url: &str) {
        if let Some(entry) = self.state.lock().tabs.get_mut(&tab) {
            entry.url = Some(url.to_string());
        }
    }

    /// Set the extractable text of a tab as a single main frame.
    pub fn set_page_text(&self, tab: TabId, text: &str) {
        self.set_page_frames(tab, vec![Some(text.to_string())]);
    }

    /// Set per-frame extraction results for a tab.
    pub fn set_page_frames(&self, tab: TabId, frames: Vec<Option<String>>) {
        self.state.lock().page_frames.insert(tab, frames);
    }

    /// Make extraction fail for a tab (injection blocked).
    pub fn fail_extraction_for(&self, tab: TabId) {
        self.state.lock().failing_extractions.insert(tab);
    }

    /// Make every window update fail (windows vanishing mid-layout).
    pub fn fail_window_updates(&self, fail: bool) {
        self.state.lock().fail_window_updates = fail;
    }

    /// Close a window out-of-band, dropping its tabs. The caller is
    /// responsible for feeding the corresponding events.
    pub fn close_window(&self, window: WindowId) {
        let mut state = self.state.lock();
        state.windows.remove(&window);
        state.tabs.retain(|_, tab| tab.window != window);
        if state.focused_normal == Some(window) {
            state.focused_normal = None;
        }
    }

    /// Close a tab out-of-band.
    pub fn close_tab(&self, tab: TabId) {
        let mut state = self.state.lock();
        state.tabs.remove(&tab);
        if state.active_tab == Some(tab) {
            state.active_tab = None;
        }
    }

    /// Current geometry of a window, for assertions.
    pub fn window_rect(&self, window: WindowId) -> Option<(Bounds, WindowState)> {
        self.state
            .lock()
            .windows
            .get(&window)
            .map(|w| (w.bounds, w.state))
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().windows.len()
    }

    /// All live window ids, in creation order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.state.lock().windows.keys().copied().collect()
    }

    /// All messages delivered to tabs so far, in order.
    pub fn sent_messages(&self) -> Vec<(TabId, TabMessage)> {
        self.state.lock().sent_messages.clone()
    }

    pub fn is_glowing(&self, tab: TabId) -> bool {
        self.state.lock().glowing.contains(&tab)
    }

    fn tab_snapshot(state: &MockState, id: TabId) -> Option<TabInfo> {
        state.tabs.get(&id).map(|tab| TabInfo {
            id,
            window: tab.window,
            url: tab.url.clone(),
            active: state.active_tab == Some(id),
        })
    }
}

#[async_trait]
impl BrowserGateway for MockBrowser {
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo, GatewayError> {
        let state = self.state.lock();
        Self::tab_snapshot(&state, tab).ok_or(GatewayError::TabNotFound(tab))
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, GatewayError> {
        let state = self.state.lock();
        Ok(state.active_tab.and_then(|id| Self::tab_snapshot(&state, id)))
    }

    async fn all_tabs(&self) -> Result<Vec<TabInfo>, GatewayError> {
        let state = self.state.lock();
        Ok(state
            .tabs
            .keys()
            .filter_map(|id| Self::tab_snapshot(&state, *id))
            .collect())
    }

    async fn create_tab(&self, url: &str, active: bool) -> Result<TabId, GatewayError> {
        let mut state = self.state.lock();
        let window = state
            .focused_normal
            .ok_or_else(|| GatewayError::CreateFailed("no normal window".to_string()))?;
        let id = TabId(state.next_tab);
        state.next_tab += 1;
        state.tabs.insert(
            id,
            MockTab {
                window,
                url: Some(url.to_string()),
            },
        );
        if active {
            state.active_tab = Some(id);
        }
        Ok(id)
    }

    async fn create_window(&self, request: CreateWindow) -> Result<CreatedWindow, GatewayError> {
        let mut state = self.state.lock();
        let window = WindowId(state.next_window);
        state.next_window += 1;
        state.windows.insert(
            window,
            MockWindow {
                bounds: Bounds::from(request.bounds),
                state: WindowState::Normal,
                kind: request.kind,
            },
        );
        let tab = TabId(state.next_tab);
        state.next_tab += 1;
        state.tabs.insert(
            tab,
            MockTab {
                window,
                url: Some(request.url),
            },
        );
        Ok(CreatedWindow { window, tab })
    }

    async fn window_info(&self, window: WindowId) -> Result<WindowInfo, GatewayError> {
        let state = self.state.lock();
        state
            .windows
            .get(&window)
            .map(|w| WindowInfo {
                id: window,
                bounds: w.bounds,
                state: w.state,
            })
            .ok_or(GatewayError::WindowNotFound(window))
    }

    async fn last_focused_normal_window(&self) -> Result<Option<WindowInfo>, GatewayError> {
        let state = self.state.lock();
        Ok(state.focused_normal.and_then(|id| {
            state
                .windows
                .get(&id)
                .filter(|w| w.kind == WindowKind::Normal)
                .map(|w| WindowInfo {
                    id,
                    bounds: w.bounds,
                    state: w.state,
                })
        }))
    }

    async fn update_window(
        &self,
        window: WindowId,
        update: crate::gateway::WindowUpdate,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if state.fail_window_updates {
            return Err(GatewayError::UpdateFailed {
                window,
                message: "update disabled by test".to_string(),
            });
        }
        let entry = state
            .windows
            .get_mut(&window)
            .ok_or(GatewayError::WindowNotFound(window))?;
        if let Some(left) = update.left {
            entry.bounds.left = Some(left);
        }
        if let Some(top) = update.top {
            entry.bounds.top = Some(top);
        }
        if let Some(width) = update.width {
            entry.bounds.width = Some(width);
        }
        if let Some(height) = update.height {
            entry.bounds.height = Some(height);
        }
        if let Some(window_state) = update.state {
            entry.state = window_state;
        }
        Ok(())
    }

    async fn remove_window(&self, window: WindowId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if state.windows.remove(&window).is_none() {
            return Err(GatewayError::WindowNotFound(window));
        }
        state.tabs.retain(|_, tab| tab.window != window);
        Ok(())
    }

    async fn displays(&self) -> Result<Vec<DisplayDescriptor>, GatewayError> {
        Ok(self.state.lock().displays.clone())
    }

    async fn send_tab_message(&self, tab: TabId, message: TabMessage) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if !state.tabs.contains_key(&tab) {
            return Err(GatewayError::MessageFailed {
                tab,
                message: "receiving end does not exist".to_string(),
            });
        }
        state.sent_messages.push((tab, message));
        Ok(())
    }
}

#[async_trait]
impl PageExtractor for MockBrowser {
    async fn extract(&self, tab: TabId) -> Result<Vec<Option<String>>, GatewayError> {
        let state = self.state.lock();
        if state.failing_extractions.contains(&tab) {
            return Err(GatewayError::InjectionFailed {
                tab,
                message: "injection blocked by test".to_string(),
            });
        }
        if !state.tabs.contains_key(&tab) {
            return Err(GatewayError::TabNotFound(tab));
        }
        Ok(state.page_frames.get(&tab).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TabGlow for MockBrowser {
    async fn enable(&self, tab: TabId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if !state.tabs.contains_key(&tab) {
            return Err(GatewayError::MessageFailed {
                tab,
                message: "script not loaded".to_string(),
            });
        }
        state.glowing.insert(tab);
        Ok(())
    }

    async fn disable(&self, tab: TabId) -> Result<(), GatewayError> {
        self.state.lock().glowing.remove(&tab);
        Ok(())
    }
}
