//! AutoDrop - Window Entry Point
//!
//! Loads the optional application config, sets up logging, and opens the
//! transfer window. Everything else lives in the library.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{anyhow, Context, Result};
use autodrop::core::config::AppConfig;
use autodrop::core::logging;
use autodrop::ui::{AutoDropApp, APP_TITLE};
use log::info;

fn main() -> Result<()> {
    // Load configuration
    let config = match AppConfig::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: Failed to load config file: {}", e);
            AppConfig::default()
        }
    };

    logging::init(&config.logging).context("Failed to open log file")?;

    info!("{} v{}", autodrop::NAME, autodrop::VERSION);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable)
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        "AutoDrop",
        options,
        Box::new(move |cc| Ok(Box::new(AutoDropApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow!("Failed to open window: {}", e))?;

    Ok(())
}
