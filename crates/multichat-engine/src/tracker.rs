//! The active-tab state machine.
//!
//! Five independent event sources (tab activation, tab load, both
//! navigation callbacks, SPA history updates) all converge on one
//! question: which single tab is being mirrored into the companion's
//! cache right now. The tracker answers it with named transition
//! methods over one session value rather than scattered flags. The
//! triggers overlap deliberately; different site architectures only
//! reliably fire a subset of them, and every resulting scheduler
//! invocation is independently revalidated, so redundant calls are
//! harmless.

use std::sync::Arc;

use tracing::{debug, info};

use multichat_browser::{BrowserGateway, TabGlow};
use multichat_config::CompanionSettings;
use multichat_layout::LayoutManager;
use multichat_protocols::command::CompanionSettingsUpdate;
use multichat_protocols::{ServiceKey, TabId, TabMessage, WindowId};

use crate::cache::ContentCache;
use crate::error::EngineError;
use crate::scheduler::CacheScheduler;
use crate::session::{CompanionSession, SessionSlot};

/// Marker prefixing user-highlighted text appended to cached content.
const SELECTION_MARKER: &str = "\n\nHighlighted text: ";

/// Drives companion sessions in response to browser events.
pub struct ActiveTabTracker {
    gateway: Arc<dyn BrowserGateway>,
    glow: Arc<dyn TabGlow>,
    layout: Arc<LayoutManager>,
    session: SessionSlot,
    cache: ContentCache,
    scheduler: CacheScheduler,
}

impl ActiveTabTracker {
    pub fn new(
        gateway: Arc<dyn BrowserGateway>,
        glow: Arc<dyn TabGlow>,
        layout: Arc<LayoutManager>,
        session: SessionSlot,
        cache: ContentCache,
        scheduler: CacheScheduler,
    ) -> Self {
        Self {
            gateway,
            glow,
            layout,
            session,
            cache,
            scheduler,
        }
    }

    pub async fn is_active(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Start a companion session for `service`, tearing down any
    /// prior session first. Begins watching the browser's current
    /// active tab.
    pub async fn start(
        &self,
        service: ServiceKey,
        settings: CompanionSettings,
    ) -> Result<(), EngineError> {
        self.stop().await;

        let placement = self.layout.open_companion(&service).await?;
        if let Err(e) = self
            .gateway
            .send_tab_message(
                placement.companion.tab,
                TabMessage::MarkAsCompanion {
                    service: service.clone(),
                },
            )
            .await
        {
            // The content script loads after the page does
            debug!("Companion tab not ready to be marked: {e}");
        }

        info!("Starting companion session for {service}");
        *self.session.write().await = Some(CompanionSession {
            companion_window: placement.companion.window,
            control_panel_window: placement.control_panel.window,
            companion_tab: placement.companion.tab,
            service,
            watched_tab: None,
            settings,
            saved_geometry: placement.saved,
        });

        if let Ok(Some(active)) = self.gateway.active_tab().await {
            self.on_tab_activated(active.id).await;
        }
        Ok(())
    }

    /// End the session: restore the displaced browser window and
    /// close both owned windows. Every step is best-effort; already
    /// scheduled extraction attempts fire later and no-op. Idle when
    /// no session exists.
    pub async fn stop(&self) {
        let Some(session) = self.session.write().await.take() else {
            return;
        };
        info!("Stopping companion session for {}", session.service);
        if let Some(watched) = session.watched_tab {
            let _ = self.glow.disable(watched).await;
        }
        self.layout.restore_geometry(&session.saved_geometry).await;
        for window in [session.companion_window, session.control_panel_window] {
            if let Err(e) = self.gateway.remove_window(window).await {
                debug!("Companion window {window} already gone: {e}");
            }
        }
        self.cache.clear();
    }

    /// Swap the companion to a different service, preserving settings
    /// and the watched tab.
    pub async fn switch_service(&self, service: ServiceKey) -> Result<(), EngineError> {
        let (settings, watched) = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(EngineError::NoActiveSession)?;
            (session.settings, session.watched_tab)
        };
        self.stop().await;
        self.start(service, settings).await?;
        if let Some(tab) = watched {
            self.on_tab_activated(tab).await;
        }
        Ok(())
    }

    /// Make `tab` the watched tab, clearing the cache and swapping
    /// the glow indicator when it actually changed. Returns the
    /// session's copy-context flag, or `None` when the session ended
    /// while this was running.
    async fn watch(&self, tab: TabId) -> Option<bool> {
        let (previous, copy_context) = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut()?;
            let previous = session.watched_tab;
            session.watched_tab = Some(tab);
            (previous, session.settings.copy_context)
        };
        if previous != Some(tab) {
            // Stale content from the old tab must never be served
            // while the new tab's extraction is pending.
            self.cache.clear();
            if let Some(prev) = previous {
                let _ = self.glow.disable(prev).await;
            }
            if let Err(e) = self.glow.enable(tab).await {
                debug!("Glow unavailable on {tab}: {e}");
            }
        }
        Some(copy_context)
    }

    /// Stop watching whatever tab was watched and empty the cache.
    async fn unwatch(&self) {
        let previous = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else { return };
            session.watched_tab.take()
        };
        self.cache.clear();
        if let Some(prev) = previous {
            let _ = self.glow.disable(prev).await;
        }
    }

    /// The user switched focus to `tab`.
    pub async fn on_tab_activated(&self, tab: TabId) {
        let companion_tab = {
            let guard = self.session.read().await;
            let Some(session) = guard.as_ref() else { return };
            session.companion_tab
        };
        if tab == companion_tab {
            debug!("Ignoring activation of the companion's own tab");
            return;
        }
        let Ok(info) = self.gateway.tab_info(tab).await else {
            return;
        };
        if !info.is_web_page() {
            // Settings pages and the like: terminal for this tab,
            // not an error.
            self.unwatch().await;
            return;
        }
        if let Some(copy_context) = self.watch(tab).await {
            if copy_context {
                self.scheduler.schedule(tab, false);
            }
        }
    }

    /// A main-frame navigation is starting in `tab`. The old content
    /// is definitely about to be wrong, so invalidate eagerly.
    pub async fn on_before_navigate(&self, tab: TabId) {
        let watched = {
            let guard = self.session.read().await;
            let Some(session) = guard.as_ref() else { return };
            session.watched_tab
        };
        if watched == Some(tab) {
            self.cache.clear();
        }
        let active = self.gateway.active_tab().await.ok().flatten();
        if active.is_some_and(|t| t.id == tab) {
            if watched != Some(tab) {
                self.cache.clear();
            }
            // A previously untracked new tab becomes watched here
            self.on_tab_activated(tab).await;
        }
    }

    /// A main-frame navigation (or tab load) finished in `tab`.
    pub async fn on_navigation_completed(&self, tab: TabId) {
        let (companion_tab, watched) = {
            let guard = self.session.read().await;
            let Some(session) = guard.as_ref() else { return };
            (session.companion_tab, session.watched_tab)
        };
        if tab == companion_tab {
            return;
        }
        let active = self.gateway.active_tab().await.ok().flatten();
        if !active.is_some_and(|t| t.id == tab) && watched != Some(tab) {
            return;
        }
        let Ok(info) = self.gateway.tab_info(tab).await else {
            return;
        };
        if !info.is_web_page() {
            if watched == Some(tab) {
                self.unwatch().await;
            }
            return;
        }
        if let Some(copy_context) = self.watch(tab).await {
            if copy_context {
                self.scheduler.schedule(tab, true);
            }
        }
    }

    /// The watched tab's SPA route changed without a full navigation.
    /// Same tab, new virtual page: reschedule without touching the
    /// watched-tab identity.
    pub async fn on_history_updated(&self, tab: TabId) {
        let relevant = self
            .session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.watched_tab == Some(tab) && s.settings.copy_context);
        if relevant {
            self.scheduler.schedule(tab, true);
        }
    }

    /// Apply a partial settings update to the live session.
    pub async fn on_settings_updated(&self, update: &CompanionSettingsUpdate) {
        let watched = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else { return };
            session.settings.apply(update);
            session.watched_tab
        };
        match update.copy_context {
            Some(false) => self.cache.clear(),
            Some(true) => {
                if let Some(tab) = watched {
                    self.scheduler.schedule(tab, false);
                }
            }
            None => {}
        }
    }

    /// A window closed. Ends the session when it was one of the two
    /// owned windows; returns whether that happened.
    pub async fn on_window_removed(&self, window: WindowId) -> bool {
        let owned = self
            .session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.owns_window(window));
        if owned {
            self.stop().await;
        }
        owned
    }

    /// The watched tab closed.
    pub async fn on_tab_removed(&self, tab: TabId) {
        let was_watched = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else { return };
            if session.watched_tab == Some(tab) {
                session.watched_tab = None;
                true
            } else {
                false
            }
        };
        if was_watched {
            self.cache.clear();
        }
    }

    /// The user's selection in the watched tab changed. Appended to
    /// the cached page text, replacing any previous selection suffix.
    pub async fn on_selection_changed(&self, tab: TabId, selection: &str) {
        let relevant = self
            .session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.watched_tab == Some(tab) && s.settings.copy_context);
        if !relevant {
            return;
        }
        let Some((page, url)) = self.cache.get() else {
            return;
        };
        let base = match page.find(SELECTION_MARKER) {
            Some(at) => &page[..at],
            None => page.as_str(),
        };
        let selection = selection.trim();
        if selection.is_empty() {
            if base.len() != page.len() {
                self.cache.set(base.to_string(), url);
            }
        } else {
            self.cache.set(format!("{base}{SELECTION_MARKER}{selection}"), url);
        }
    }

    /// Run one extraction attempt for the watched tab right now.
    pub async fn refresh(&self) -> Result<(), EngineError> {
        let tab = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(EngineError::NoActiveSession)?;
            session.watched_tab.ok_or(EngineError::NoWatchedTab)?
        };
        self.scheduler.attempt(tab).await;
        Ok(())
    }
}
