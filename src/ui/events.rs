//! UI Events Module
//!
//! Messages sent from background workers to the window. The window drains
//! them once per frame.

use std::path::PathBuf;

use crate::core::error::{DeviceError, TransferError};
use crate::core::transfer::TransferOutcome;

/// Events emitted by background operations
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A line for the log pane
    Log(String),

    /// A transfer run ended
    TransferFinished(Result<TransferOutcome, TransferError>),

    /// A device pull ended; `Ok` carries the folder the files landed in
    PullFinished(Result<PathBuf, DeviceError>),
}

impl UiEvent {
    /// Whether this event ends an operation
    pub fn is_completion(&self) -> bool {
        !matches!(self, UiEvent::Log(_))
    }
}
