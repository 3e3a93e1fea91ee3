//! Persisted settings record
//!
//! The window remembers the last source folder, destination folder and the
//! move/copy choice between sessions. The record is a small JSON object kept
//! next to the application config:
//!
//! - Windows: `%LOCALAPPDATA%\AutoDrop\autodrop_config.json`
//! - Linux: `~/.local/share/AutoDrop/autodrop_config.json`
//! - macOS: `~/Library/Application Support/AutoDrop/autodrop_config.json`
//!
//! A missing or unreadable file is never an error for the user; it simply
//! means "nothing saved yet".

use crate::core::config::get_config_dir;
use crate::core::error::SettingsError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the settings record inside the config directory
pub const SETTINGS_FILE_NAME: &str = "autodrop_config.json";

/// The values the window restores at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Source folder as typed or picked by the user
    pub source: String,

    /// Destination root under which dated folders are created
    pub destination: String,

    /// Move entries instead of copying them
    #[serde(rename = "move")]
    pub move_files: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: String::new(),
            destination: String::new(),
            move_files: true,
        }
    }
}

/// Reads and writes the [`Settings`] record
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default per-user location
    pub fn new() -> Self {
        Self::with_path(Self::default_settings_path())
    }

    /// Store backed by a custom file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default settings file path, falling back to the working directory
    pub fn default_settings_path() -> PathBuf {
        get_config_dir()
            .map(|dir| dir.join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved record, or defaults if nothing usable is on disk
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Ignoring unreadable settings file '{}': {}",
                    self.path.display(),
                    e
                );
                Settings::default()
            }
        }
    }

    /// Load the saved record, reporting read and parse failures
    ///
    /// A missing file is not a failure and yields the defaults.
    pub fn try_load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!("No settings file at {}", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Overwrite the backing file with `settings`
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;

        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
