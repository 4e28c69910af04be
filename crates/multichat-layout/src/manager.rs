//! The stateful window layout manager.
//!
//! Realizes companion placement and the two tiled layouts as actual
//! window geometry, and keeps a recorded layout consistent across
//! retile requests and display changes. Individual window operations
//! are best-effort: a failed move is logged and the rest of the
//! layout still gets applied.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use multichat_browser::{BrowserGateway, CreateWindow, CreatedWindow, WindowKind, WindowUpdate};
use multichat_config::ServiceCatalog;
use multichat_protocols::{
    Bounds, DisplayDescriptor, DisplayId, LayoutKind, Rect, ServiceKey, WindowId, WindowState,
};

use crate::display::display_containing;
use crate::error::LayoutError;
use crate::partition::{bottom_slots, vertical_slots, LayoutSlots};

/// Layout tuning knobs. The defaults reproduce the original screen
/// proportions; none of the exact values are load-bearing for
/// correctness.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Fixed width of the companion strip.
    pub companion_width: u32,
    /// Height of the control-panel strip above the companion.
    pub control_panel_height: u32,
    /// The vertical layout's popup takes `width / divisor`.
    pub vertical_popup_divisor: u32,
    /// Height of the bottom layout's popup strip.
    pub bottom_popup_height: u32,
    /// Standalone popup size and margin from the bottom-right corner.
    pub popup_width: u32,
    pub popup_height: u32,
    pub popup_margin: i32,
    /// Extension-internal pages loaded into the control windows.
    pub popup_url: String,
    pub control_panel_url: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            companion_width: 400,
            control_panel_height: 55,
            vertical_popup_divisor: 4,
            bottom_popup_height: 140,
            popup_width: 420,
            popup_height: 320,
            popup_margin: 20,
            popup_url: "panel/popup.html".to_string(),
            control_panel_url: "panel/companion.html".to_string(),
        }
    }
}

/// Geometry of a browser window captured before the companion shrank
/// it, reapplied on session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedGeometry {
    pub window: WindowId,
    pub bounds: Bounds,
    pub state: WindowState,
}

/// Windows created for a companion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionPlacement {
    pub companion: CreatedWindow,
    pub control_panel: CreatedWindow,
    pub saved: SavedGeometry,
}

#[derive(Debug, Clone)]
struct LayoutEntry {
    window: WindowId,
    service: ServiceKey,
}

#[derive(Debug, Default)]
struct TiledLayoutState {
    kind: Option<LayoutKind>,
    services: Vec<ServiceKey>,
    display: Option<DisplayId>,
    entries: Vec<LayoutEntry>,
    popup: Option<WindowId>,
}

impl TiledLayoutState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Creates, destroys, and repositions the windows implementing a
/// chosen layout.
pub struct LayoutManager {
    gateway: Arc<dyn BrowserGateway>,
    catalog: ServiceCatalog,
    config: LayoutConfig,
    state: RwLock<TiledLayoutState>,
}

impl LayoutManager {
    pub fn new(gateway: Arc<dyn BrowserGateway>, catalog: ServiceCatalog, config: LayoutConfig) -> Self {
        Self {
            gateway,
            catalog,
            config,
            state: RwLock::new(TiledLayoutState::default()),
        }
    }

    /// The display hosting the last focused normal window, falling
    /// back to the primary display.
    async fn target_display(&self) -> Result<DisplayDescriptor, LayoutError> {
        let displays = self.gateway.displays().await?;
        if displays.is_empty() {
            return Err(LayoutError::NoDisplays);
        }
        let focused = self.gateway.last_focused_normal_window().await?;
        let bounds = focused.map(|w| w.bounds).unwrap_or_default();
        Ok(display_containing(&bounds, &displays).clone())
    }

    /// Best-effort window update; a failure is logged and swallowed
    /// so the rest of the layout operation continues.
    async fn safe_update(&self, window: WindowId, update: WindowUpdate) {
        if let Err(e) = self.gateway.update_window(window, update).await {
            warn!("Failed to update {window}: {e}");
        }
    }

    async fn safe_remove(&self, window: WindowId) {
        if let Err(e) = self.gateway.remove_window(window).await {
            debug!("Window {window} already gone: {e}");
        }
    }

    /// Keep only known services; never tile zero windows.
    fn effective_services(&self, requested: &[ServiceKey]) -> Vec<ServiceKey> {
        let filtered = self.catalog.filter_valid(requested);
        if filtered.is_empty() {
            warn!("No valid services to tile, using defaults");
            ServiceCatalog::default_services()
        } else {
            filtered
        }
    }

    fn slots_for(&self, kind: LayoutKind, work_area: &Rect, count: usize) -> LayoutSlots {
        match kind {
            LayoutKind::Vertical => {
                vertical_slots(work_area, count, self.config.vertical_popup_divisor)
            }
            LayoutKind::Bottom => bottom_slots(work_area, count, self.config.bottom_popup_height),
        }
    }

    /// Tear down any recorded tiled windows and popup.
    async fn destroy_current(&self) {
        let (entries, popup) = {
            let mut state = self.state.write().await;
            let entries = std::mem::take(&mut state.entries);
            let popup = state.popup.take();
            state.reset();
            (entries, popup)
        };
        for entry in entries {
            self.safe_remove(entry.window).await;
        }
        if let Some(popup) = popup {
            self.safe_remove(popup).await;
        }
    }

    /// Replace the current layout wholesale with a fresh tiling of
    /// the requested services.
    pub async fn tile(&self, kind: LayoutKind, requested: &[ServiceKey]) -> Result<(), LayoutError> {
        let display = self.target_display().await?;
        self.destroy_current().await;

        let services = self.effective_services(requested);
        let slots = self.slots_for(kind, &display.work_area, services.len());
        let display_id = &display.id;
        info!("Tiling {} services ({kind:?}) on display {display_id}", services.len());

        let mut entries = Vec::with_capacity(services.len());
        for (service, rect) in services.iter().zip(&slots.services) {
            let created = self
                .gateway
                .create_window(CreateWindow {
                    url: self.catalog.launch_url(service).to_string(),
                    kind: WindowKind::Popup,
                    bounds: *rect,
                })
                .await?;
            entries.push(LayoutEntry {
                window: created.window,
                service: service.clone(),
            });
        }

        let popup = self
            .gateway
            .create_window(CreateWindow {
                url: self.config.popup_url.clone(),
                kind: WindowKind::Popup,
                bounds: slots.popup,
            })
            .await?;

        let mut state = self.state.write().await;
        state.kind = Some(kind);
        state.services = services;
        state.display = Some(display.id);
        state.entries = entries;
        state.popup = Some(popup.window);
        Ok(())
    }

    /// Vertical tiling: service windows side by side with the control
    /// popup in a right-hand strip.
    pub async fn tile_vertical(&self, requested: &[ServiceKey]) -> Result<(), LayoutError> {
        self.tile(LayoutKind::Vertical, requested).await
    }

    /// Bottom tiling: service windows side by side with the control
    /// popup in a bottom strip.
    pub async fn tile_bottom(&self, requested: &[ServiceKey]) -> Result<(), LayoutError> {
        self.tile(LayoutKind::Bottom, requested).await
    }

    /// Open the requested services as background tabs, untiled.
    pub async fn open_tabs(&self, requested: &[ServiceKey]) -> Result<(), LayoutError> {
        for service in requested {
            self.gateway
                .create_tab(self.catalog.launch_url(service), false)
                .await?;
        }
        Ok(())
    }

    /// Open a standalone control popup in the bottom-right corner of
    /// the primary display.
    pub async fn open_popup(&self) -> Result<WindowId, LayoutError> {
        let displays = self.gateway.displays().await?;
        if displays.is_empty() {
            return Err(LayoutError::NoDisplays);
        }
        let work = displays[0].work_area;
        let width = self.config.popup_width;
        let height = self.config.popup_height;
        let bounds = Rect::new(
            work.left + work.width as i32 - width as i32 - self.config.popup_margin,
            work.top + work.height as i32 - height as i32 - self.config.popup_margin,
            width,
            height,
        );
        let created = self
            .gateway
            .create_window(CreateWindow {
                url: self.config.popup_url.clone(),
                kind: WindowKind::Popup,
                bounds,
            })
            .await?;
        self.state.write().await.popup = Some(created.window);
        Ok(created.window)
    }

    /// Reapply the recorded layout's partition onto a (possibly new)
    /// work area by moving the existing windows. Uses the same
    /// math as [`tile`], so the partition stays exact.
    pub async fn retile(&self, work_area: &Rect) {
        let (kind, windows, popup) = {
            let state = self.state.read().await;
            let Some(kind) = state.kind else { return };
            (
                kind,
                state.entries.iter().map(|e| e.window).collect::<Vec<_>>(),
                state.popup,
            )
        };
        if windows.is_empty() {
            return;
        }
        let slots = self.slots_for(kind, work_area, windows.len());
        for (window, rect) in windows.iter().zip(&slots.services) {
            self.safe_update(*window, WindowUpdate::place(*rect)).await;
        }
        if let Some(popup) = popup {
            self.safe_update(popup, WindowUpdate::place(slots.popup)).await;
        }
    }

    /// Re-resolve displays and reapply the recorded layout, rebuilding
    /// it wholesale when any of its windows has vanished.
    pub async fn raise_and_retile(&self) -> Result<(), LayoutError> {
        let (kind, services, recorded_display, windows) = {
            let state = self.state.read().await;
            let Some(kind) = state.kind else {
                debug!("No tiled layout to retile");
                return Ok(());
            };
            if state.entries.is_empty() {
                debug!("No tiled layout to retile");
                return Ok(());
            }
            (
                kind,
                state.services.clone(),
                state.display.clone(),
                state.entries.iter().map(|e| e.window).collect::<Vec<_>>(),
            )
        };

        let displays = self.gateway.displays().await?;
        if displays.is_empty() {
            warn!("Unable to retile because no displays were returned");
            return Err(LayoutError::NoDisplays);
        }

        // A monitor may have been unplugged since the layout was made.
        let target = displays
            .iter()
            .find(|d| Some(&d.id) == recorded_display.as_ref())
            .unwrap_or(&displays[0])
            .clone();
        self.state.write().await.display = Some(target.id.clone());

        for window in &windows {
            if self.gateway.window_info(*window).await.is_err() {
                info!("Missing tiled window during retile, rebuilding layout");
                return self.tile(kind, &services).await;
            }
        }

        self.retile(&target.work_area).await;
        Ok(())
    }

    /// Record that a window was closed out-of-band. Returns true when
    /// this ended tiling mode (last tiled window or the control popup
    /// closed), in which case the recorded layout is discarded.
    pub async fn on_window_removed(&self, window: WindowId) -> bool {
        let mut state = self.state.write().await;
        let mut ended = false;

        if state.popup == Some(window) {
            state.popup = None;
            ended = !state.entries.is_empty();
        }

        let before = state.entries.len();
        state.entries.retain(|entry| entry.window != window);
        if state.entries.len() < before && state.entries.is_empty() {
            ended = true;
        }

        if ended {
            state.reset();
        }
        ended
    }

    /// The recorded layout kind, if any.
    pub async fn current_kind(&self) -> Option<LayoutKind> {
        self.state.read().await.kind
    }

    /// Place a companion next to the focused browser window.
    ///
    /// Shrinks the browser window to the left portion of its display,
    /// then stacks a control-panel strip and the companion window in
    /// the freed right-hand strip. The saved geometry lets the
    /// session restore the browser window later.
    pub async fn open_companion(&self, service: &ServiceKey) -> Result<CompanionPlacement, LayoutError> {
        let focused = self
            .gateway
            .last_focused_normal_window()
            .await?
            .ok_or(LayoutError::NoFocusedWindow)?;

        let displays = self.gateway.displays().await?;
        if displays.is_empty() {
            return Err(LayoutError::NoDisplays);
        }
        let work = display_containing(&focused.bounds, &displays).work_area;

        let companion_width = self.config.companion_width;
        let panel_height = self.config.control_panel_height;
        let browser_width = work.width.saturating_sub(companion_width).max(1);
        let companion_left = work.left + browser_width as i32;
        let companion_height = work.height.saturating_sub(panel_height).max(1);

        let saved = SavedGeometry {
            window: focused.id,
            bounds: focused.bounds,
            state: focused.state,
        };

        // Shrink the browser window to tile against the companion.
        // Forcing the normal state also un-maximizes it.
        self.safe_update(
            focused.id,
            WindowUpdate::place(Rect::new(work.left, work.top, browser_width, work.height)),
        )
        .await;

        let companion = self
            .gateway
            .create_window(CreateWindow {
                url: self.catalog.launch_url(service).to_string(),
                kind: WindowKind::Popup,
                bounds: Rect::new(
                    companion_left,
                    work.top + panel_height as i32,
                    companion_width,
                    companion_height,
                ),
            })
            .await?;

        let control_panel = self
            .gateway
            .create_window(CreateWindow {
                url: self.config.control_panel_url.clone(),
                kind: WindowKind::Popup,
                bounds: Rect::new(companion_left, work.top, companion_width, panel_height),
            })
            .await?;

        info!("Opened companion for {service} on window {}", companion.window);
        Ok(CompanionPlacement {
            companion,
            control_panel,
            saved,
        })
    }

    /// Reapply saved geometry to the browser window the companion
    /// displaced. Best-effort: the window may be gone.
    pub async fn restore_geometry(&self, saved: &SavedGeometry) {
        let update = WindowUpdate {
            left: saved.bounds.left,
            top: saved.bounds.top,
            width: saved.bounds.width,
            height: saved.bounds.height,
            state: Some(saved.state),
        };
        if let Err(e) = self.gateway.update_window(saved.window, update).await {
            warn!("Failed to restore browser window: {e}");
        } else {
            debug!("Restored browser window {} to original position", saved.window);
        }
    }
}
