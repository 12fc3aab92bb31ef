//! Engine configuration.
//!
//! Settings are stored as JSON. Every field has a default from
//! [`crate::constants`], so a partial file (or no file at all) is valid.

use crate::constants::{
    FIT_PADDING, MAX_SCALE, MAX_UNDO_DEPTH, MAX_WRITE_ATTEMPTS, MIN_MARKER_SIZE, MIN_SCALE,
    RETRY_BASE_DELAY_MS, TAP_SLOP,
};
use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Tunables for gesture classification, history and persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Lower bound for the view scale
    pub min_scale: f32,
    /// Upper bound for the view scale
    pub max_scale: f32,
    /// Markers must exceed this size (content units) in both dimensions
    pub min_marker_size: f32,
    /// Undo snapshots kept per image
    pub undo_depth: usize,
    /// View-space movement allowed before a tap becomes a drag
    pub tap_slop: f32,
    /// Horizontal padding for fit-to-screen
    pub fit_padding: f32,
    /// Attempts per write before a failure is reported
    pub max_write_attempts: u32,
    /// Base delay of the exponential retry backoff
    pub retry_base_delay_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            min_marker_size: MIN_MARKER_SIZE,
            undo_depth: MAX_UNDO_DEPTH,
            tap_slop: TAP_SLOP,
            fit_padding: FIT_PADDING,
            max_write_attempts: MAX_WRITE_ATTEMPTS,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
        }
    }
}

impl EngineSettings {
    /// Load settings from the default location, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = default_settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate settings from an explicit path.
    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.min_scale > 0.0) {
            return Err(invalid("min_scale", "must be positive"));
        }
        if self.max_scale < self.min_scale {
            return Err(invalid("max_scale", "must not be below min_scale"));
        }
        if self.min_marker_size < 0.0 {
            return Err(invalid("min_marker_size", "must not be negative"));
        }
        if self.undo_depth == 0 {
            return Err(invalid("undo_depth", "must keep at least one snapshot"));
        }
        if self.tap_slop < 0.0 {
            return Err(invalid("tap_slop", "must not be negative"));
        }
        if self.max_write_attempts == 0 {
            return Err(invalid("max_write_attempts", "must be at least 1"));
        }
        Ok(())
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn invalid(field: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// `<config dir>/occlude/settings.json`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("occlude").join("settings.json"))
}
