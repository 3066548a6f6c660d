use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::SettingsError;

/// The persisted preference record. Loaded once per page lifetime;
/// any change to it reloads the page instead of being applied live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub show_bookmarks: bool,
    pub show_all_windows: bool,
    pub allow_debug_logs: bool,
    pub show_page_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_bookmarks: false,
            show_all_windows: false,
            allow_debug_logs: false,
            show_page_header: true,
        }
    }
}

impl Settings {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.allow_debug_logs {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Key/value store holding the settings record.
///
/// `take_change` drains the change notification: it returns true once after
/// every successful `set`, which the host turns into a page reload.
pub trait SettingsStore {
    fn get(&self) -> Settings;
    fn set(&mut self, settings: &Settings) -> Result<(), SettingsError>;
    fn take_change(&mut self) -> bool;
}

/// Settings kept in a JSON file.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    changed: bool,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        // Write to tmp, then rename, so a crash never leaves a half-written record.
        fs::write(&tmp_path, json)?;
        fs::rename(tmp_path, &self.path)?;

        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            log::warn!("[Settings] Failed to load settings: {}, returning defaults", e);
            Settings::default()
        })
    }

    fn set(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.save(settings)?;
        self.changed = true;
        Ok(())
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

/// Settings held in memory, for tests and the replay host.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Settings,
    changed: bool,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            changed: false,
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Settings {
        self.settings.clone()
    }

    fn set(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.settings = settings.clone();
        self.changed = true;
        Ok(())
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.show_bookmarks);
        assert!(!settings.show_all_windows);
        assert!(!settings.allow_debug_logs);
        assert!(settings.show_page_header);
        assert_eq!(settings.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"showAllWindows": true}"#).unwrap();
        assert!(settings.show_all_windows);
        assert!(settings.show_page_header);
        assert!(!settings.show_bookmarks);
    }

    #[test]
    fn test_json_store_save_and_load() {
        let dir = tempdir().unwrap();
        let mut store = JsonSettingsStore::new(dir.path().join("nested").join("settings.json"));
        assert_eq!(store.get(), Settings::default());
        assert!(!store.take_change());

        let settings = Settings {
            show_bookmarks: true,
            allow_debug_logs: true,
            ..Settings::default()
        };
        store.set(&settings).unwrap();

        assert_eq!(store.get(), settings);
        assert!(store.take_change());
        assert!(!store.take_change());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_json_store_corrupt_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::new(&path);
        assert!(store.load().is_err());
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn test_memory_store_notifies_once_per_set() {
        let mut store = MemorySettingsStore::default();
        store.set(&Settings::default()).unwrap();
        assert!(store.take_change());
        assert!(!store.take_change());
    }
}
