//! Persisted user preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemePreference::Dark
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    theme: ThemePreference,
}

/// `$HOME/.config/trialscope/preferences.json`, or the temp dir without HOME.
pub fn default_preferences_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config"))
        .unwrap_or_else(std::env::temp_dir);
    base.join("trialscope").join("preferences.json")
}

/// JSON file holding the theme choice.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme. Missing or unreadable files give the light theme.
    pub fn load_theme(&self) -> ThemePreference {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), "no stored preferences: {}", e);
                return ThemePreference::default();
            }
        };
        match serde_json::from_str::<PreferencesFile>(&content) {
            Ok(file) => file.theme,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable preferences: {}", e);
                ThemePreference::default()
            }
        }
    }

    pub fn save_theme(&self, theme: ThemePreference) -> AppResult<()> {
        let write_err = |source| AppError::PreferencesWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(&PreferencesFile { theme })
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(&self.path, content).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PreferenceStore {
        let dir = std::env::temp_dir().join(format!("ts-app-prefs-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        PreferenceStore::new(dir.join("preferences.json"))
    }

    #[test]
    fn missing_file_is_light() {
        assert_eq!(temp_store("missing").load_theme(), ThemePreference::Light);
    }

    #[test]
    fn theme_survives_a_restart() {
        let store = temp_store("roundtrip");
        store.save_theme(ThemePreference::Dark).unwrap();
        let reopened = PreferenceStore::new(store.path());
        assert_eq!(reopened.load_theme(), ThemePreference::Dark);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"dark\""));
    }

    #[test]
    fn unknown_theme_is_ignored() {
        let store = temp_store("unknown");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"theme": "sepia"}"#).unwrap();
        assert_eq!(store.load_theme(), ThemePreference::Light);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert!(ThemePreference::Light.toggled().is_dark());
    }
}
