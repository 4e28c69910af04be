//! Which tabs currently run which chat service.
//!
//! Populated by content-script registrations and by a full tab scan
//! at startup; pruned when tabs close or navigate off a service host.
//! All operations are total; removing something absent is a no-op.

use std::collections::BTreeMap;

use tracing::debug;

use multichat_browser::TabInfo;
use multichat_config::ServiceCatalog;
use multichat_protocols::{ServiceKey, TabId};

/// Service to open-tabs mapping. An empty tab list is equivalent to
/// the key being absent; per-service order is insertion order.
#[derive(Debug, Default)]
pub struct ServiceTabRegistry {
    entries: BTreeMap<ServiceKey, Vec<TabId>>,
}

impl ServiceTabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `tab` runs `service`. Idempotent; returns whether
    /// the tab was newly added.
    pub fn register(&mut self, service: ServiceKey, tab: TabId) -> bool {
        let tabs = self.entries.entry(service).or_default();
        if tabs.contains(&tab) {
            return false;
        }
        tabs.push(tab);
        true
    }

    /// Remove a tab from every service. Returns whether anything
    /// changed.
    pub fn remove_tab(&mut self, tab: TabId) -> bool {
        let mut changed = false;
        self.entries.retain(|_, tabs| {
            let before = tabs.len();
            tabs.retain(|t| *t != tab);
            changed |= tabs.len() < before;
            !tabs.is_empty()
        });
        changed
    }

    /// Drop a service entry wholesale.
    pub fn remove_service(&mut self, service: &ServiceKey) -> bool {
        self.entries.remove(service).is_some()
    }

    /// Remove a tab's registration everywhere except `keep`. Used
    /// when a tab navigates: its old service registration is stale
    /// unless the destination is the same service.
    pub fn deregister_if_moved(&mut self, tab: TabId, keep: Option<&ServiceKey>) -> bool {
        let mut changed = false;
        self.entries.retain(|service, tabs| {
            if Some(service) == keep {
                return true;
            }
            let before = tabs.len();
            tabs.retain(|t| *t != tab);
            changed |= tabs.len() < before;
            !tabs.is_empty()
        });
        changed
    }

    /// The tabs registered for one service, in registration order.
    pub fn tabs_for(&self, service: &ServiceKey) -> Vec<TabId> {
        self.entries.get(service).cloned().unwrap_or_default()
    }

    /// Full snapshot, one entry per service that has tabs.
    pub fn snapshot(&self) -> Vec<(ServiceKey, Vec<TabId>)> {
        self.entries
            .iter()
            .map(|(service, tabs)| (service.clone(), tabs.clone()))
            .collect()
    }

    /// Rebuild from a full tab scan, matching each tab's URL against
    /// the catalog. Replaces all current entries.
    pub fn rebuild(&mut self, tabs: &[TabInfo], catalog: &ServiceCatalog) {
        self.entries.clear();
        for tab in tabs {
            let Some(url) = tab.url.as_deref() else { continue };
            if let Some(service) = catalog.match_url(url) {
                self.register(service, tab.id);
            }
        }
        debug!("Rebuilt service registry with {} services", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multichat_protocols::WindowId;

    fn key(name: &str) -> ServiceKey {
        ServiceKey::from(name)
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ServiceTabRegistry::new();
        assert!(registry.register(key("chatgpt"), TabId(1)));
        assert!(!registry.register(key("chatgpt"), TabId(1)));
        assert_eq!(registry.tabs_for(&key("chatgpt")), vec![TabId(1)]);
    }

    #[test]
    fn test_remove_tab_drops_empty_services() {
        let mut registry = ServiceTabRegistry::new();
        registry.register(key("chatgpt"), TabId(1));
        registry.register(key("claude"), TabId(1));
        registry.register(key("claude"), TabId(2));

        assert!(registry.remove_tab(TabId(1)));
        assert!(registry.snapshot().iter().all(|(s, _)| *s != key("chatgpt")));
        assert_eq!(registry.tabs_for(&key("claude")), vec![TabId(2)]);

        // Removing again is a no-op
        assert!(!registry.remove_tab(TabId(1)));
    }

    #[test]
    fn test_remove_service_wholesale() {
        let mut registry = ServiceTabRegistry::new();
        registry.register(key("chatgpt"), TabId(1));
        registry.register(key("chatgpt"), TabId(2));
        registry.register(key("claude"), TabId(3));

        assert!(registry.remove_service(&key("chatgpt")));
        assert!(registry.tabs_for(&key("chatgpt")).is_empty());
        assert_eq!(registry.tabs_for(&key("claude")), vec![TabId(3)]);

        // Absent keys are a no-op
        assert!(!registry.remove_service(&key("chatgpt")));
        assert!(!registry.remove_service(&key("gemini")));
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut registry = ServiceTabRegistry::new();
        registry.register(key("claude"), TabId(9));
        registry.register(key("claude"), TabId(3));
        registry.register(key("claude"), TabId(7));
        assert_eq!(
            registry.tabs_for(&key("claude")),
            vec![TabId(9), TabId(3), TabId(7)]
        );
    }

    #[test]
    fn test_deregister_if_moved() {
        let mut registry = ServiceTabRegistry::new();
        registry.register(key("chatgpt"), TabId(1));

        // Navigating within the same service keeps the registration
        assert!(!registry.deregister_if_moved(TabId(1), Some(&key("chatgpt"))));
        assert_eq!(registry.tabs_for(&key("chatgpt")), vec![TabId(1)]);

        // Navigating elsewhere drops it
        assert!(registry.deregister_if_moved(TabId(1), None));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_rebuild_from_tab_scan() {
        let catalog = ServiceCatalog::builtin();
        let tab = |id: u64, url: &str| TabInfo {
            id: TabId(id),
            window: WindowId(1),
            url: Some(url.to_string()),
            active: false,
        };
        let tabs = vec![
            tab(1, "https://chatgpt.com/c/abc"),
            tab(2, "https://example.com/"),
            tab(3, "https://claude.ai/new"),
            tab(4, "https://www.chatgpt.com/"),
        ];

        let mut registry = ServiceTabRegistry::new();
        registry.register(key("gemini"), TabId(99));
        registry.rebuild(&tabs, &catalog);

        assert_eq!(registry.tabs_for(&key("chatgpt")), vec![TabId(1), TabId(4)]);
        assert_eq!(registry.tabs_for(&key("claude")), vec![TabId(3)]);
        // Pre-rebuild contents are gone
        assert!(registry.tabs_for(&key("gemini")).is_empty());
    }
}
