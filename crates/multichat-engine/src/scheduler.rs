//! Delayed, self-validating extraction attempts.
//!
//! Pages routinely render their content asynchronously after the
//! load event, so a single extraction at navigation time misses it.
//! The scheduler fires a fixed ladder of attempts instead; each
//! attempt revalidates at fire time that the session still exists
//! and the tab is still the watched one, and silently drops itself
//! otherwise. Attempts are never cancelled; superseded attempts
//! detect their own irrelevance. Overlapping attempts for the same
//! tab are idempotent, with the last one to complete winning the
//! cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use multichat_browser::{BrowserGateway, PageExtractor, TabInfo};
use multichat_protocols::TabId;

use crate::cache::ContentCache;
use crate::extract::{join_frames, truncate_to_word_limit, DEFAULT_WORD_LIMIT};
use crate::session::SessionSlot;

/// Attempt delays after a full navigation or SPA route change, in
/// milliseconds. The long tail covers slow-rendering sites.
pub const NEW_NAVIGATION_DELAYS_MS: [u64; 5] = [500, 2000, 5000, 10000, 15000];

/// Attempt delays after a switch to an already-loaded tab. The first
/// attempt runs immediately.
pub const TAB_SWITCH_DELAYS_MS: [u64; 4] = [0, 1000, 5000, 10000];

/// Spawns and runs extraction attempts. Cheap to clone.
#[derive(Clone)]
pub struct CacheScheduler {
    gateway: Arc<dyn BrowserGateway>,
    extractor: Arc<dyn PageExtractor>,
    session: SessionSlot,
    cache: ContentCache,
    word_limit: usize,
}

impl CacheScheduler {
    pub fn new(
        gateway: Arc<dyn BrowserGateway>,
        extractor: Arc<dyn PageExtractor>,
        session: SessionSlot,
        cache: ContentCache,
    ) -> Self {
        Self {
            gateway,
            extractor,
            session,
            cache,
            word_limit: DEFAULT_WORD_LIMIT,
        }
    }

    /// Schedule the attempt ladder for a tab. Returns immediately;
    /// the attempts run as independent spawned tasks.
    pub fn schedule(&self, tab: TabId, is_new_navigation: bool) {
        let delays: &[u64] = if is_new_navigation {
            &NEW_NAVIGATION_DELAYS_MS
        } else {
            &TAB_SWITCH_DELAYS_MS
        };
        debug!("Scheduling {} extraction attempts for {tab}", delays.len());
        for &delay_ms in delays {
            let this = self.clone();
            tokio::spawn(async move {
                if delay_ms > 0 {
                    sleep(Duration::from_millis(delay_ms)).await;
                }
                this.attempt(tab).await;
            });
        }
    }

    /// Whether an attempt for `tab` is still relevant: a session
    /// exists, the tab is still the watched one, and context copying
    /// is enabled. Checked at fire time, never at schedule time.
    async fn still_watched(&self, tab: TabId) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.watched_tab == Some(tab) && s.settings.copy_context)
    }

    /// Clear the cache, but only if the attempt is still relevant.
    /// A stale attempt must not wipe a successor's content.
    async fn clear_if_watched(&self, tab: TabId) {
        if self.still_watched(tab).await {
            self.cache.clear();
        }
    }

    /// One extraction attempt. Also invoked directly (awaited) by the
    /// manual refresh command.
    pub async fn attempt(&self, tab: TabId) {
        if !self.still_watched(tab).await {
            return;
        }

        let info: TabInfo = match self.gateway.tab_info(tab).await {
            Ok(info) => info,
            Err(e) => {
                debug!("Extraction attempt for closed {tab}: {e}");
                self.clear_if_watched(tab).await;
                return;
            }
        };
        let Some(url) = info.url.clone().filter(|u| u.starts_with("http")) else {
            self.clear_if_watched(tab).await;
            return;
        };

        let frames = match self.extractor.extract(tab).await {
            Ok(frames) => frames,
            Err(e) => {
                debug!("Extraction failed for {tab}: {e}");
                self.clear_if_watched(tab).await;
                return;
            }
        };
        let text = join_frames(&frames);

        // The user may have switched tabs while extraction was in
        // flight; a stale result must not land in the cache.
        if !self.still_watched(tab).await {
            return;
        }
        if text.is_empty() {
            self.cache.clear();
        } else {
            self.cache.set(truncate_to_word_limit(&text, self.word_limit), url);
        }
    }
}
