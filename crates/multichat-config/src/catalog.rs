//! Service catalog: which hosts count as which chat service, and the
//! URL used to launch a fresh window or tab for it.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;
use url::Url;

use multichat_protocols::ServiceKey;

use crate::error::ConfigError;

/// Fallback service triple used when a tiling request filters down to
/// nothing. A tile request never produces zero windows.
pub const DEFAULT_SERVICES: [&str; 3] = ["chatgpt", "claude", "gemini"];

/// Service keys longer than this are rejected as malformed input from
/// UI surfaces.
const MAX_SERVICE_KEY_LEN: usize = 50;

/// One catalog entry: a display label, the hostname pattern that
/// identifies the service, and its launch URL.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    pub label: String,
    pub host_pattern: Regex,
    pub launch_url: String,
}

/// The set of known chat services.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: BTreeMap<ServiceKey, ServiceEntry>,
}

impl ServiceCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in catalog of supported services.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        let builtin: [(&str, &str, &str, &str); 9] = [
            (
                "chatgpt",
                "ChatGPT",
                r"(?:chat\.openai\.com|chatgpt\.com)$",
                "https://chatgpt.com/",
            ),
            ("claude", "Claude", r"claude\.ai$", "https://claude.ai/new"),
            (
                "gemini",
                "Gemini",
                r"gemini\.google\.com$",
                "https://gemini.google.com/app",
            ),
            (
                "perplexity",
                "Perplexity",
                r"perplexity\.ai$",
                "https://perplexity.ai/",
            ),
            (
                "deepseek",
                "Deepseek",
                r"(chat\.)?deepseek\.com$",
                "https://chat.deepseek.com/",
            ),
            ("grok", "Grok", r"(grok\.x\.ai|grok\.com)$", "https://grok.com/"),
            ("zai", "Z AI", r"chat\.z\.ai$", "https://chat.z.ai/"),
            ("qwen", "Qwen", r"chat\.qwen\.ai$", "https://chat.qwen.ai/"),
            ("kimi", "Kimi", r"kimi\.com$", "https://kimi.com/"),
        ];
        for (key, label, pattern, launch_url) in builtin {
            // Built-in patterns are known-valid.
            if let Err(e) = catalog.insert(key.into(), label, pattern, launch_url) {
                warn!("Skipping malformed builtin service {key}: {e}");
            }
        }
        catalog
    }

    /// Add or replace a service entry.
    pub fn insert(
        &mut self,
        key: ServiceKey,
        label: &str,
        host_pattern: &str,
        launch_url: &str,
    ) -> Result<(), ConfigError> {
        let host_pattern = Regex::new(host_pattern).map_err(|source| ConfigError::InvalidPattern {
            service: key.to_string(),
            source,
        })?;
        self.entries.insert(
            key,
            ServiceEntry {
                label: label.to_string(),
                host_pattern,
                launch_url: launch_url.to_string(),
            },
        );
        Ok(())
    }

    /// Remove a service entry.
    pub fn remove(&mut self, key: &ServiceKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn get(&self, key: &ServiceKey) -> Option<&ServiceEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All known service keys, in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.entries.keys()
    }

    /// Launch URL for a service. Unknown keys fall back to the first
    /// default service so a launch request always opens something.
    pub fn launch_url(&self, key: &ServiceKey) -> &str {
        match self.entries.get(key) {
            Some(entry) => &entry.launch_url,
            None => {
                warn!("Unknown service {key}, falling back to {}", DEFAULT_SERVICES[0]);
                self.entries
                    .get(&ServiceKey::from(DEFAULT_SERVICES[0]))
                    .map(|entry| entry.launch_url.as_str())
                    .unwrap_or("https://chatgpt.com/")
            }
        }
    }

    /// Which service, if any, a page URL belongs to. Only http(s)
    /// URLs can match; a leading `www.` on the host is ignored.
    pub fn match_url(&self, url: &str) -> Option<ServiceKey> {
        if !url.starts_with("http") {
            return None;
        }
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let host = host.strip_prefix("www.").unwrap_or(host);
        self.entries
            .iter()
            .find(|(_, entry)| entry.host_pattern.is_match(host))
            .map(|(key, _)| key.clone())
    }

    /// Drop malformed or unknown keys from a tiling request. Does not
    /// apply the default fallback; callers decide what an empty
    /// result means.
    pub fn filter_valid(&self, requested: &[ServiceKey]) -> Vec<ServiceKey> {
        requested
            .iter()
            .filter(|key| {
                let valid = !key.as_str().is_empty()
                    && key.as_str().len() < MAX_SERVICE_KEY_LEN
                    && self.contains(key);
                if !valid {
                    warn!("Filtering out invalid service: {key}");
                }
                valid
            })
            .cloned()
            .collect()
    }

    /// The fallback triple as owned keys.
    pub fn default_services() -> Vec<ServiceKey> {
        DEFAULT_SERVICES.iter().map(|s| ServiceKey::from(*s)).collect()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_default_triple() {
        let catalog = ServiceCatalog::builtin();
        for key in DEFAULT_SERVICES {
            assert!(catalog.contains(&ServiceKey::from(key)), "missing {key}");
        }
    }

    #[test]
    fn test_match_url_strips_www() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(
            catalog.match_url("https://www.chatgpt.com/c/123"),
            Some(ServiceKey::from("chatgpt"))
        );
        assert_eq!(
            catalog.match_url("https://claude.ai/new"),
            Some(ServiceKey::from("claude"))
        );
    }

    #[test]
    fn test_match_url_rejects_non_http() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(catalog.match_url("about:blank"), None);
        assert_eq!(catalog.match_url("chrome://settings"), None);
    }

    #[test]
    fn test_match_url_unrelated_host() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(catalog.match_url("https://example.com/"), None);
        // Suffix match must anchor on the host end, not substring
        assert_eq!(catalog.match_url("https://claude.ai.evil.com/"), None);
    }

    #[test]
    fn test_filter_valid_drops_unknown_and_malformed() {
        let catalog = ServiceCatalog::builtin();
        let requested = vec![
            ServiceKey::from("chatgpt"),
            ServiceKey::from("not-a-real-service"),
            ServiceKey::from(""),
            ServiceKey::from("x".repeat(60).as_str()),
            ServiceKey::from("claude"),
        ];
        let filtered = catalog.filter_valid(&requested);
        assert_eq!(
            filtered,
            vec![ServiceKey::from("chatgpt"), ServiceKey::from("claude")]
        );
    }

    #[test]
    fn test_launch_url_known_and_unknown() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(
            catalog.launch_url(&ServiceKey::from("gemini")),
            "https://gemini.google.com/app"
        );
        assert_eq!(
            catalog.launch_url(&ServiceKey::from("nope")),
            "https://chatgpt.com/"
        );
    }

    #[test]
    fn test_insert_invalid_pattern() {
        let mut catalog = ServiceCatalog::new();
        let result = catalog.insert(ServiceKey::from("bad"), "Bad", "(", "https://bad/");
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_custom_service() {
        let mut catalog = ServiceCatalog::builtin();
        catalog
            .insert(
                ServiceKey::from("copilot"),
                "Copilot",
                r"copilot\.microsoft\.com$",
                "https://copilot.microsoft.com/",
            )
            .unwrap();
        assert_eq!(
            catalog.match_url("https://copilot.microsoft.com/chat"),
            Some(ServiceKey::from("copilot"))
        );
        assert!(catalog.remove(&ServiceKey::from("copilot")));
        assert!(!catalog.remove(&ServiceKey::from("copilot")));
    }
}
