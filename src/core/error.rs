//! Error types for AutoDrop
//!
//! Each operation the window can trigger has its own error enum so the
//! caller can tell a missing folder apart from an ADB timeout without
//! parsing messages. The `Display` text of every variant is what ends up
//! in the log pane (prefixed with `❌`).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a transfer run before or while it is set up
///
/// Failures of individual entries are not errors at this level; they are
/// recorded in the run's outcome and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Source path is missing or not a directory
    #[error("Source folder not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Destination path is missing or not a directory
    #[error("Destination folder not found: {}", .0.display())]
    DestinationNotFound(PathBuf),

    /// Dated folder, log file or source listing could not be created/read
    #[error("I/O error at '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl TransferError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Errors from the ADB device bridge
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No attached device was reported
    #[error("No ADB device found. Check connection and USB Debugging.")]
    NoDevice,

    /// The adb executable could not be started
    #[error("Could not run '{program}': {message}. Is ADB installed and on your PATH?")]
    ToolUnavailable { program: String, message: String },

    /// `adb pull` did not finish within the configured timeout
    #[error("ADB pull timed out after {0}s. Check connection and try again.")]
    PullTimedOut(u64),

    /// `adb pull` exited with a non-zero status; `reason` is the last line
    /// adb wrote to stderr, when there was one
    #[error("ADB pull failed{}{}. Make sure your phone is connected and USB Debugging is ON.",
        exit_code_suffix(.code), reason_suffix(.reason))]
    PullFailed {
        code: Option<i32>,
        reason: Option<String>,
    },

    /// Local staging directory could not be prepared
    #[error("I/O error at '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit code {})", c))
        .unwrap_or_default()
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {}", r.trim_end_matches('.')))
        .unwrap_or_default()
}

/// Errors from the persisted settings record
#[derive(Error, Debug, Clone)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("IO error: {0}")]
    Io(String),

    /// The settings file is not valid JSON for the record
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Serialization(err.to_string())
    }
}

/// Result type alias for transfer runs
pub type Result<T> = std::result::Result<T, TransferError>;
