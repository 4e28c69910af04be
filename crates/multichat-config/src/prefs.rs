//! Persisted user preferences.
//!
//! Preferences are stored as a single TOML document. Absent keys use
//! hardcoded defaults; the file is rewritten wholesale on every
//! relevant change. The schema is not versioned.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use multichat_protocols::command::CompanionSettingsUpdate;
use multichat_protocols::{LayoutKind, ServiceKey};

use crate::catalog::ServiceCatalog;
use crate::error::ConfigError;

/// Companion-mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionSettings {
    /// When false, no extraction occurs and the cache stays empty.
    pub copy_context: bool,
    /// Whether the control panel is showing its expanded options.
    pub is_expanded: bool,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            copy_context: true,
            is_expanded: false,
        }
    }
}

impl CompanionSettings {
    /// Apply a partial update, leaving absent fields unchanged.
    pub fn apply(&mut self, update: &CompanionSettingsUpdate) {
        if let Some(copy_context) = update.copy_context {
            self.copy_context = copy_context;
        }
        if let Some(is_expanded) = update.is_expanded {
            self.is_expanded = is_expanded;
        }
    }
}

/// The full persisted preference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub companion: CompanionSettings,
    /// Service the companion opens when none is named.
    pub default_companion_service: ServiceKey,
    /// Services selected in the tiling UI.
    pub checked_services: Vec<ServiceKey>,
    /// The last broadcast prompt, for replay.
    pub last_prompt_text: String,
    /// Last tiling layout the user chose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_layout: Option<LayoutKind>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            companion: CompanionSettings::default(),
            default_companion_service: ServiceKey::from("chatgpt"),
            checked_services: ServiceCatalog::default_services(),
            last_prompt_text: String::new(),
            last_layout: None,
        }
    }
}

/// Loads and saves [`Preferences`] at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional per-user location.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoPreferencesPath)?;
        Ok(Self::new(base.join("multichat").join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, or defaults when the file does not exist.
    pub fn load(&self) -> Result<Preferences, ConfigError> {
        if !self.path.exists() {
            debug!("No preferences file at {}, using defaults", self.path.display());
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let prefs: Preferences = toml::from_str(&content)?;
        Ok(prefs)
    }

    /// Persist the full preference document.
    pub fn save(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(prefs)?;
        fs::write(&self.path, content)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert!(prefs.companion.copy_context);
        assert!(!prefs.companion.is_expanded);
        assert_eq!(prefs.default_companion_service, ServiceKey::from("chatgpt"));
        assert_eq!(
            prefs.checked_services,
            vec![
                ServiceKey::from("chatgpt"),
                ServiceKey::from("claude"),
                ServiceKey::from("gemini"),
            ]
        );
        assert!(prefs.last_prompt_text.is_empty());
    }

    #[test]
    fn test_settings_apply_partial() {
        let mut settings = CompanionSettings::default();
        settings.apply(&CompanionSettingsUpdate {
            copy_context: Some(false),
            is_expanded: None,
        });
        assert!(!settings.copy_context);
        assert!(!settings.is_expanded);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("prefs.toml"));
        let prefs = store.load().unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = PreferencesStore::new(dir.path().join("nested").join("prefs.toml"));

        let mut prefs = Preferences::default();
        prefs.companion.copy_context = false;
        prefs.default_companion_service = ServiceKey::from("claude");
        prefs.last_prompt_text = "compare these".to_string();
        prefs.last_layout = Some(LayoutKind::Bottom);

        store.save(&prefs).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let prefs: Preferences = toml::from_str("last_prompt_text = \"hi\"").unwrap();
        assert_eq!(prefs.last_prompt_text, "hi");
        assert!(prefs.companion.copy_context);
        assert_eq!(prefs.checked_services.len(), 3);
    }
}
