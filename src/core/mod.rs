//! Core functionality module
//!
//! This module contains the business logic of AutoDrop, independent of the
//! window that drives it.
//!
//! # Submodules
//!
//! - `config` - Application configuration (TOML) and per-user locations
//! - `error` - Error types and result aliases
//! - `file_ops` - Copy/move primitives with the overwrite/merge policy
//! - `logging` - Diagnostic logging setup
//! - `settings` - The persisted source/destination/move record
//! - `transfer` - The dated-folder transfer engine

pub mod config;
pub mod error;
pub mod file_ops;
pub mod logging;
pub mod settings;
pub mod transfer;
