//! Configuration module for AutoDrop
//!
//! Supports loading optional application configuration from a TOML file.
//! Everything has a default, so the file only needs the keys you want to
//! change. Configuration is looked up in:
//! - `./autodrop.toml` (current directory, for development/override)
//! - Windows: %LOCALAPPDATA%\AutoDrop\config.toml
//! - Linux: ~/.local/share/AutoDrop/config.toml
//! - macOS: ~/Library/Application Support/AutoDrop/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory name under the per-user data location
pub const APP_DIR_NAME: &str = "AutoDrop";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file name checked in the current directory first
const LOCAL_CONFIG_FILE_NAME: &str = "autodrop.toml";

/// Folder (inside the config dir) that `adb pull` writes into
const PHONE_DUMP_DIR_NAME: &str = "PhoneDump";

/// Get the per-user directory AutoDrop keeps its files in.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging settings
    pub logging: LoggingConfig,

    /// ADB device bridge settings
    pub device: DeviceConfig,

    /// Main window settings
    pub window: WindowConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Also write the diagnostic log to a file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

/// ADB device bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// adb executable (name on PATH or full path)
    pub adb_path: String,

    /// Directory on the phone to pull
    pub remote_path: String,

    /// Seconds to wait for `adb pull` before giving up
    pub pull_timeout_secs: u64,

    /// Seconds to wait for `adb devices`
    pub detect_timeout_secs: u64,

    /// Local staging directory for pulled files (empty = default)
    pub local_dir: PathBuf,
}

/// Main window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub resizable: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("./autodrop.log"),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: "adb".to_string(),
            remote_path: "/sdcard/Download/Meta View/".to_string(),
            pull_timeout_secs: 30,
            detect_timeout_secs: 10,
            local_dir: PathBuf::new(), // Empty = <config dir>/PhoneDump
        }
    }
}

impl DeviceConfig {
    /// Directory `adb pull` writes into
    pub fn effective_local_dir(&self) -> PathBuf {
        if !self.local_dir.as_os_str().is_empty() {
            return self.local_dir.clone();
        }
        get_config_dir()
            .map(|dir| dir.join(PHONE_DUMP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(PHONE_DUMP_DIR_NAME))
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 750.0,
            height: 600.0,
            resizable: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError(_, msg) => ConfigError::ParseError(path.to_path_buf(), msg),
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(PathBuf::new(), e.to_string()))
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./autodrop.toml
    /// 2. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
