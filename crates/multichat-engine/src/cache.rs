//! The single-slot page content cache.
//!
//! Holds at most one (text, url) pair for the companion's watched
//! tab. Every mutation emits a `ContentCacheUpdated` notification so
//! the control panel stays current without polling.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use multichat_protocols::Notification;

use crate::extract::word_count;

#[derive(Debug, Clone)]
struct CachedPage {
    text: String,
    url: String,
}

/// Shared cache handle. Cheap to clone; all clones share the slot.
///
/// The url-implies-text invariant is structural: both live in one
/// optional pair and are only ever set or cleared together.
#[derive(Clone)]
pub struct ContentCache {
    slot: Arc<Mutex<Option<CachedPage>>>,
    notifier: broadcast::Sender<Notification>,
}

impl ContentCache {
    pub fn new(notifier: broadcast::Sender<Notification>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            notifier,
        }
    }

    /// Replace the cached content.
    pub fn set(&self, text: String, url: String) {
        let note = Notification::ContentCacheUpdated {
            has_content: true,
            preview: Some(text.clone()),
            url: Some(url.clone()),
            word_count: word_count(&text),
        };
        *self.slot.lock() = Some(CachedPage { text, url });
        let _ = self.notifier.send(note);
    }

    /// Empty the cache. Safe to call repeatedly.
    pub fn clear(&self) {
        *self.slot.lock() = None;
        let _ = self.notifier.send(Notification::ContentCacheUpdated {
            has_content: false,
            preview: None,
            url: None,
            word_count: 0,
        });
    }

    /// Read-only snapshot of the cached (text, url) pair.
    pub fn get(&self) -> Option<(String, String)> {
        self.slot
            .lock()
            .as_ref()
            .map(|page| (page.text.clone(), page.url.clone()))
    }

    pub fn has_content(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (ContentCache, broadcast::Receiver<Notification>) {
        let (tx, rx) = broadcast::channel(16);
        (ContentCache::new(tx), rx)
    }

    #[test]
    fn test_set_then_get() {
        let (cache, _rx) = cache();
        cache.set("hello world".to_string(), "https://example.com".to_string());
        assert_eq!(
            cache.get(),
            Some(("hello world".to_string(), "https://example.com".to_string()))
        );
        assert!(cache.has_content());
    }

    #[test]
    fn test_clear_empties_both_fields() {
        let (cache, _rx) = cache();
        cache.set("text".to_string(), "https://a".to_string());
        cache.clear();
        assert_eq!(cache.get(), None);
        assert!(!cache.has_content());
    }

    #[test]
    fn test_set_notifies_with_word_count() {
        let (cache, mut rx) = cache();
        cache.set("one two three".to_string(), "https://a".to_string());
        match rx.try_recv().unwrap() {
            Notification::ContentCacheUpdated {
                has_content,
                word_count,
                url,
                ..
            } => {
                assert!(has_content);
                assert_eq!(word_count, 3);
                assert_eq!(url.as_deref(), Some("https://a"));
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn test_clear_notifies_no_content() {
        let (cache, mut rx) = cache();
        cache.clear();
        match rx.try_recv().unwrap() {
            Notification::ContentCacheUpdated { has_content, word_count, .. } => {
                assert!(!has_content);
                assert_eq!(word_count, 0);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn test_works_without_listener() {
        let (tx, rx) = broadcast::channel(16);
        drop(rx);
        let cache = ContentCache::new(tx);
        // Send errors from having no receiver are ignored
        cache.set("text".to_string(), "https://a".to_string());
        cache.clear();
    }
}
