//! AutoDrop Library
//!
//! Copies or moves everything in a source folder into a dated subfolder
//! (`<destination>/YYYY-MM-DD`) of a destination folder, writing a
//! `log.txt` for each run. Files can first be pulled off an Android phone
//! with `adb`.
//!
//! # Architecture
//!
//! - [`core`] - Configuration, settings persistence, error types, and the
//!   transfer engine
//! - [`device`] - The `adb` device bridge behind a testable command runner
//! - [`ui`] - The egui window, background task controller, and events
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use autodrop::core::settings::SettingsStore;
//! use autodrop::core::transfer::{TransferEngine, TransferRequest};
//!
//! let engine = TransferEngine::new(SettingsStore::new());
//! let request = TransferRequest::new("/home/me/PhoneDump", "/mnt/archive", false);
//!
//! match engine.run(&request, |line| println!("{}", line)) {
//!     Ok(outcome) => println!("{} entries in {}", outcome.transferred, outcome.dated_folder.display()),
//!     Err(e) => eprintln!("❌ {}", e),
//! }
//! ```
//!
//! # Pulling From a Phone
//!
//! ```rust,no_run
//! use autodrop::core::config::DeviceConfig;
//! use autodrop::device::{DeviceBridge, SystemRunner};
//!
//! let bridge = DeviceBridge::new(SystemRunner::new(), &DeviceConfig::default());
//! if let Ok(folder) = bridge.pull_from_device(|line| println!("{}", line)) {
//!     println!("New source folder: {}", folder.display());
//! }
//! ```

pub mod core;
pub mod device;
pub mod ui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
