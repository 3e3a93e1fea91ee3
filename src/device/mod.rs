//! Device interaction module
//!
//! Pulls files from an Android phone with the `adb` command-line tool.
//!
//! # Submodules
//!
//! - `traits` - The `CommandRunner` abstraction over subprocesses
//! - `process` - `SystemRunner`, the real subprocess implementation
//! - `adb` - `DeviceBridge`, device detection and `adb pull`
//! - `mock` - `ScriptedRunner` for exercising the bridge without a phone
//!
//! # Architecture
//!
//! The bridge never spawns processes itself; it asks a `CommandRunner`.
//! The real runner and the scripted one implement the same trait, so the
//! pull logic (timeouts, exit codes, output parsing) is tested the same
//! way it runs.

pub mod adb;
pub mod mock;
pub mod process;
pub mod traits;

pub use adb::{parse_device_list, DeviceBridge};
pub use mock::ScriptedRunner;
pub use process::SystemRunner;
pub use traits::{CommandOutput, CommandRunner, CommandStatus};
