//! UI Module
//!
//! The AutoDrop window and the plumbing that keeps it responsive.
//!
//! # Threading Model
//!
//! The window owns all of its state on the UI thread. "Start Transfer" and
//! "Pull From Phone" hand their work to [`TaskController`], which runs it on
//! a worker thread and reports back through a channel:
//!
//! 1. **Events** - Workers send [`UiEvent`]s (log lines, then one
//!    completion event); the window drains them every frame
//! 2. **Repaint** - Each send wakes egui so lines appear as they happen
//! 3. **One at a time** - While a worker runs, the action buttons are
//!    disabled and further starts are refused

pub mod app;
pub mod controller;
pub mod events;

pub use app::{AppState, AutoDropApp, APP_TITLE};
pub use controller::TaskController;
pub use events::UiEvent;
