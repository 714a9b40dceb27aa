//! Application configuration.
//!
//! Everything has a default, so an empty file (or no file) is a valid
//! configuration. Durations are in milliseconds of the session clock.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use ts_catalog::{Catalog, builtin_catalog};
use ts_core::Millis;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Between the start announcement and the animation's modeled start.
    pub pre_delay_ms: Millis,
    /// Between the animation's end and the commit.
    pub post_delay_ms: Millis,
    /// Completion announcement delay when the trial committed without an
    /// animation.
    pub fallback_announce_ms: Millis,
    /// How long the live region stays empty before new text appears.
    pub announce_clear_ms: Millis,
    pub highlight_ms: Millis,
    pub row_slide_ms: Millis,
    /// Quiet time after a deletion before the table is released.
    pub settle_ms: Millis,
    pub theme_relayout_ms: Millis,
    /// Row height used when the table cannot measure one.
    pub fallback_row_height: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pre_delay_ms: 600,
            post_delay_ms: 800,
            fallback_announce_ms: 1000,
            announce_clear_ms: 50,
            highlight_ms: 1000,
            row_slide_ms: 300,
            settle_ms: 50,
            theme_relayout_ms: 100,
            fallback_row_height: 53.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog file (YAML or JSON). The built-in catalog when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Simulation selected on startup. The first in the catalog when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_simulation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PathBuf>,
    pub timing: TimingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            AppError::ConfigParse { message, .. } => AppError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| AppError::ConfigParse {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Catalog named by the config, or the built-in one.
    pub fn load_catalog(&self) -> AppResult<Catalog> {
        match &self.catalog {
            Some(path) => {
                info!(path = %path.display(), "loading catalog");
                Ok(ts_catalog::load_path(path)?)
            }
            None => Ok(builtin_catalog()?),
        }
    }

    /// Configured startup simulation if the catalog has it, else the first.
    pub fn initial_simulation(&self, catalog: &Catalog) -> Option<String> {
        if let Some(id) = &self.default_simulation {
            if catalog.get_simulation(id).is_some() {
                return Some(id.clone());
            }
            tracing::warn!(simulation_id = %id, "configured default simulation not in catalog");
        }
        catalog.list_simulations().first().map(|s| s.id.clone())
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences
            .clone()
            .unwrap_or_else(crate::prefs::default_preferences_path)
    }
}
