//! Command dispatch and browser-event fan-out.
//!
//! The controller owns every stateful engine component, receives the
//! browser event stream and the UI command surface, and routes each
//! to the tracker, layout manager, or registry. Notifications go out
//! over a broadcast channel; having no listener is never an error.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use multichat_browser::{BrowserGateway, PageExtractor, TabGlow};
use multichat_config::{Preferences, PreferencesStore, ServiceCatalog};
use multichat_layout::{LayoutConfig, LayoutManager};
use multichat_protocols::{
    BrowserEvent, Command, CommandReply, FeedbackStatus, LayoutKind, Notification, ServiceKey,
    StartMode, TabId, TabMessage,
};

use crate::cache::ContentCache;
use crate::registry::ServiceTabRegistry;
use crate::scheduler::CacheScheduler;
use crate::session::SessionSlot;
use crate::tracker::ActiveTabTracker;

const NOTIFY_CAPACITY: usize = 64;

/// The engine's front door.
pub struct Controller {
    gateway: Arc<dyn BrowserGateway>,
    catalog: ServiceCatalog,
    layout: Arc<LayoutManager>,
    tracker: ActiveTabTracker,
    cache: ContentCache,
    registry: RwLock<ServiceTabRegistry>,
    prefs: RwLock<Preferences>,
    store: Option<PreferencesStore>,
    notifier: broadcast::Sender<Notification>,
}

impl Controller {
    pub fn new(
        gateway: Arc<dyn BrowserGateway>,
        extractor: Arc<dyn PageExtractor>,
        glow: Arc<dyn TabGlow>,
        catalog: ServiceCatalog,
        layout_config: LayoutConfig,
        store: Option<PreferencesStore>,
    ) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        let cache = ContentCache::new(notifier.clone());
        let session = SessionSlot::default();
        let layout = Arc::new(LayoutManager::new(
            gateway.clone(),
            catalog.clone(),
            layout_config,
        ));
        let scheduler = CacheScheduler::new(
            gateway.clone(),
            extractor,
            session.clone(),
            cache.clone(),
        );
        let tracker = ActiveTabTracker::new(
            gateway.clone(),
            glow,
            layout.clone(),
            session,
            cache.clone(),
            scheduler,
        );
        let prefs = match &store {
            Some(store) => store.load().unwrap_or_else(|e| {
                warn!("Failed to load preferences, using defaults: {e}");
                Preferences::default()
            }),
            None => Preferences::default(),
        };
        Self {
            gateway,
            catalog,
            layout,
            tracker,
            cache,
            registry: RwLock::new(ServiceTabRegistry::new()),
            prefs: RwLock::new(prefs),
            store,
            notifier,
        }
    }

    /// Listen for engine notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Rebuild the service registry from a full tab scan and announce
    /// the result. Run once when the engine comes up.
    pub async fn startup(&self) {
        match self.gateway.all_tabs().await {
            Ok(tabs) => self.registry.write().await.rebuild(&tabs, &self.catalog),
            Err(e) => warn!("Tab scan failed at startup: {e}"),
        }
        self.send_status().await;
    }

    fn notify(&self, note: Notification) {
        let _ = self.notifier.send(note);
    }

    async fn persist_prefs(&self) {
        let Some(store) = &self.store else { return };
        let prefs = self.prefs.read().await.clone();
        if let Err(e) = store.save(&prefs) {
            warn!("Failed to persist preferences: {e}");
        }
    }

    /// Announce the registry contents. Every catalog service appears,
    /// with an empty tab list when none are open.
    async fn send_status(&self) {
        let services = {
            let registry = self.registry.read().await;
            self.catalog
                .keys()
                .map(|key| (key.clone(), registry.tabs_for(key)))
                .collect()
        };
        let last_prompt = self.prefs.read().await.last_prompt_text.clone();
        self.notify(Notification::StatusUpdate {
            services,
            last_prompt,
        });
    }

    /// Route a browser event to whichever components care about it.
    /// Subframe navigations never reach the components.
    pub async fn handle_event(&self, event: BrowserEvent) {
        if !event.is_main_frame() {
            return;
        }
        match event {
            BrowserEvent::TabActivated { tab } => {
                self.tracker.on_tab_activated(tab).await;
            }
            BrowserEvent::TabUpdated { tab, complete, .. } => {
                if complete {
                    self.tracker.on_navigation_completed(tab).await;
                }
            }
            BrowserEvent::BeforeNavigate { tab, url, .. } => {
                self.tracker.on_before_navigate(tab).await;
                // A tab leaving a service host is no longer a valid
                // broadcast target.
                let destination = self.catalog.match_url(&url);
                let changed = self
                    .registry
                    .write()
                    .await
                    .deregister_if_moved(tab, destination.as_ref());
                if changed {
                    self.send_status().await;
                }
            }
            BrowserEvent::NavigationCompleted { tab, .. } => {
                self.tracker.on_navigation_completed(tab).await;
            }
            BrowserEvent::HistoryStateUpdated { tab, .. } => {
                self.tracker.on_history_updated(tab).await;
            }
            BrowserEvent::TabRemoved { tab } => {
                self.tracker.on_tab_removed(tab).await;
                let changed = self.registry.write().await.remove_tab(tab);
                if changed {
                    self.send_status().await;
                }
            }
            BrowserEvent::WindowRemoved { window } => {
                if self.layout.on_window_removed(window).await {
                    self.notify(Notification::TilingModeEnded);
                }
                self.tracker.on_window_removed(window).await;
            }
        }
    }

    /// Execute a UI command.
    pub async fn handle_command(&self, command: Command) -> CommandReply {
        match command {
            Command::StartCompanionMode { service } => self.start_companion(service).await,

            Command::SwitchCompanionService { service } => {
                if !self.catalog.contains(&service) {
                    return rejected(format!("unknown service: {service}"));
                }
                if let Err(e) = self.tracker.switch_service(service.clone()).await {
                    return rejected(e.to_string());
                }
                self.prefs.write().await.default_companion_service = service;
                self.persist_prefs().await;
                CommandReply::Ack
            }

            Command::UpdateCompanionSettings { settings } => {
                self.tracker.on_settings_updated(&settings).await;
                self.prefs.write().await.companion.apply(&settings);
                self.persist_prefs().await;
                CommandReply::Ack
            }

            Command::GetCachedContent => {
                let (content, url) = match self.cache.get() {
                    Some((text, url)) => (Some(text), Some(url)),
                    None => (None, None),
                };
                CommandReply::CachedContent { content, url }
            }

            Command::RefreshPageContent => match self.tracker.refresh().await {
                Ok(()) => CommandReply::Ack,
                Err(e) => rejected(e.to_string()),
            },

            Command::OpenServices {
                targets,
                should_tile,
                is_bottom_layout,
            } => {
                let kind = if is_bottom_layout {
                    LayoutKind::Bottom
                } else {
                    LayoutKind::Vertical
                };
                {
                    let mut prefs = self.prefs.write().await;
                    prefs.checked_services = targets.clone();
                    if should_tile {
                        prefs.last_layout = Some(kind);
                    }
                }
                self.persist_prefs().await;
                let result = if should_tile {
                    self.layout.tile(kind, &targets).await
                } else {
                    self.layout.open_tabs(&targets).await
                };
                match result {
                    Ok(()) => CommandReply::Ack,
                    Err(e) => rejected(e.to_string()),
                }
            }

            Command::AutoRetile { targets, layout } => {
                {
                    let mut prefs = self.prefs.write().await;
                    prefs.checked_services = targets.clone();
                    prefs.last_layout = Some(layout);
                }
                self.persist_prefs().await;
                match self.layout.tile(layout, &targets).await {
                    Ok(()) => CommandReply::Ack,
                    Err(e) => rejected(e.to_string()),
                }
            }

            Command::RaiseAndRetile => match self.layout.raise_and_retile().await {
                Ok(()) => CommandReply::Ack,
                Err(e) => rejected(e.to_string()),
            },

            Command::OpenControlPopup => match self.layout.open_popup().await {
                Ok(_) => CommandReply::Ack,
                Err(e) => rejected(e.to_string()),
            },

            Command::RetileBottomWindows { targets } => {
                self.prefs.write().await.checked_services = targets.clone();
                self.persist_prefs().await;
                match self.layout.tile(LayoutKind::Bottom, &targets).await {
                    Ok(()) => CommandReply::Ack,
                    Err(e) => rejected(e.to_string()),
                }
            }

            Command::BroadcastPrompt { text, targets } => {
                if text.trim().is_empty() {
                    return rejected("empty prompt".to_string());
                }
                self.prefs.write().await.last_prompt_text = text.clone();
                self.persist_prefs().await;
                self.send_status().await;
                self.broadcast_prompt(&text, &targets).await;
                CommandReply::Ack
            }

            Command::SyncPromptText { text, targets } => {
                self.sync_prompt_text(&text, &targets).await;
                CommandReply::Ack
            }

            Command::ReplayLast { targets } => {
                let text = self.prefs.read().await.last_prompt_text.clone();
                if text.trim().is_empty() {
                    return rejected("no prompt to replay".to_string());
                }
                self.broadcast_prompt(&text, &targets).await;
                CommandReply::Ack
            }

            Command::RegisterService { service, tab } => {
                if service.as_str().is_empty()
                    || service.as_str().len() >= 50
                    || !self.catalog.contains(&service)
                {
                    return rejected(format!("unknown service: {service}"));
                }
                self.registry.write().await.register(service, tab);
                // Status goes out even when the tab was already known
                self.send_status().await;
                CommandReply::Ack
            }

            Command::UpdateSelection { tab, text } => {
                self.tracker.on_selection_changed(tab, &text).await;
                CommandReply::Ack
            }

            Command::RequestStatus => {
                self.send_status().await;
                CommandReply::Ack
            }

            Command::StartMode { mode } => match mode {
                StartMode::Companion => {
                    let service = self.prefs.read().await.default_companion_service.clone();
                    self.start_companion(service).await
                }
                StartMode::Bottom => self.start_tiled(LayoutKind::Bottom).await,
                StartMode::Vertical => self.start_tiled(LayoutKind::Vertical).await,
            },
        }
    }

    async fn start_companion(&self, service: ServiceKey) -> CommandReply {
        if !self.catalog.contains(&service) {
            return rejected(format!("unknown service: {service}"));
        }
        let settings = self.prefs.read().await.companion;
        if let Err(e) = self.tracker.start(service.clone(), settings).await {
            return rejected(e.to_string());
        }
        self.prefs.write().await.default_companion_service = service;
        self.persist_prefs().await;
        CommandReply::Ack
    }

    async fn start_tiled(&self, kind: LayoutKind) -> CommandReply {
        let targets = self.prefs.read().await.checked_services.clone();
        {
            let mut prefs = self.prefs.write().await;
            prefs.last_layout = Some(kind);
        }
        self.persist_prefs().await;
        match self.layout.tile(kind, &targets).await {
            Ok(()) => CommandReply::Ack,
            Err(e) => rejected(e.to_string()),
        }
    }

    /// Mirror in-progress prompt text into every registered tab of
    /// the target services. Fires on every keystroke, so failures are
    /// only logged and no feedback goes out.
    async fn sync_prompt_text(&self, text: &str, targets: &[ServiceKey]) {
        let plan: Vec<(ServiceKey, Vec<TabId>)> = {
            let registry = self.registry.read().await;
            targets
                .iter()
                .map(|service| (service.clone(), registry.tabs_for(service)))
                .collect()
        };
        for (service, tabs) in plan {
            for tab in tabs {
                let message = TabMessage::InjectTextRealtime {
                    text: text.to_string(),
                    service: service.clone(),
                };
                if let Err(e) = self.gateway.send_tab_message(tab, message).await {
                    debug!("Realtime sync to {tab} failed: {e}");
                }
            }
        }
    }

    /// Deliver a prompt to every registered tab of each target
    /// service, reporting per-tab outcomes. A failed tab never stops
    /// the rest of the fan-out.
    async fn broadcast_prompt(&self, text: &str, targets: &[ServiceKey]) {
        let plan: Vec<(ServiceKey, Vec<TabId>)> = {
            let registry = self.registry.read().await;
            targets
                .iter()
                .map(|service| (service.clone(), registry.tabs_for(service)))
                .collect()
        };
        for (service, tabs) in plan {
            if tabs.is_empty() {
                self.notify(Notification::ServiceFeedback {
                    service,
                    tab: None,
                    status: FeedbackStatus::Error,
                    error: Some("no registered tabs".to_string()),
                });
                continue;
            }
            for tab in tabs {
                let message = TabMessage::InjectAndSend {
                    text: text.to_string(),
                    service: service.clone(),
                };
                match self.gateway.send_tab_message(tab, message).await {
                    Ok(()) => self.notify(Notification::ServiceFeedback {
                        service: service.clone(),
                        tab: Some(tab),
                        status: FeedbackStatus::Sent,
                        error: None,
                    }),
                    Err(e) => {
                        warn!("Prompt delivery to {tab} failed: {e}");
                        self.notify(Notification::ServiceFeedback {
                            service: service.clone(),
                            tab: Some(tab),
                            status: FeedbackStatus::Error,
                            error: Some(e.to_string()),
                        });
                    }
                }
            }
        }
    }
}

fn rejected(reason: String) -> CommandReply {
    CommandReply::Rejected { reason }
}
