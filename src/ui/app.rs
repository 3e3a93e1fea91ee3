//! Main window
//!
//! `AppState` holds everything the window shows and is updated only on the
//! UI thread. `AutoDropApp` wires it to egui, the settings store, and the
//! background [`TaskController`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use egui::{Color32, RichText};
use log::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::settings::{Settings, SettingsStore};
use crate::core::transfer::{TransferEngine, TransferOutcome, TransferRequest};
use crate::device::{DeviceBridge, SystemRunner};
use crate::ui::controller::TaskController;
use crate::ui::events::UiEvent;

/// Window title
pub const APP_TITLE: &str = "AutoDrop - Data Transfer Tool";

const PULL_BUTTON: Color32 = Color32::from_rgb(0x21, 0x96, 0xF3);
const TRANSFER_BUTTON: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);
const LOG_BG: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);
const LOG_FG: Color32 = Color32::from_rgb(0xEE, 0xEE, 0xEE);

/// Everything the window displays
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub source: String,
    pub destination: String,
    pub move_files: bool,
    /// Log pane contents, oldest first
    pub log: Vec<String>,
    /// Result of the most recent successful run
    pub last_outcome: Option<TransferOutcome>,
}

impl AppState {
    /// Fields pre-filled from the saved settings
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            source: settings.source,
            destination: settings.destination,
            move_files: settings.move_files,
            log: Vec::new(),
            last_outcome: None,
        }
    }

    /// Append to the log pane; multi-line messages become several lines
    pub fn log(&mut self, message: impl AsRef<str>) {
        self.log
            .extend(message.as_ref().split('\n').map(str::to_string));
    }

    /// The request "Start Transfer" would send right now
    pub fn transfer_request(&self) -> TransferRequest {
        TransferRequest::new(
            self.source.trim(),
            self.destination.trim(),
            self.move_files,
        )
    }

    /// Fold a worker event into the state
    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.log(line),
            UiEvent::TransferFinished(Ok(outcome)) => {
                self.last_outcome = Some(outcome);
            }
            UiEvent::TransferFinished(Err(e)) => self.log(format!("❌ {}", e)),
            UiEvent::PullFinished(Ok(path)) => {
                self.source = path.display().to_string();
            }
            UiEvent::PullFinished(Err(e)) => self.log(format!("❌ {}", e)),
        }
    }
}

/// The eframe application
pub struct AutoDropApp {
    state: AppState,
    controller: TaskController,
    engine: TransferEngine,
    bridge: Arc<DeviceBridge<SystemRunner>>,
}

impl AutoDropApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        let ctx = cc.egui_ctx.clone();
        let controller = TaskController::new().with_notifier(move || ctx.request_repaint());
        Self::with_parts(controller, SettingsStore::new(), config)
    }

    /// Build the app from explicit parts
    pub fn with_parts(controller: TaskController, settings: SettingsStore, config: &AppConfig) -> Self {
        let state = AppState::from_settings(settings.load());
        info!("Settings loaded from {}", settings.path().display());

        Self {
            state,
            controller,
            engine: TransferEngine::new(settings),
            bridge: Arc::new(DeviceBridge::new(SystemRunner::new(), &config.device)),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// "Start Transfer"
    pub fn start_transfer(&mut self) {
        let request = self.state.transfer_request();
        info!(
            "Starting transfer {} -> {} (move: {})",
            request.source.display(),
            request.destination.display(),
            request.move_files
        );
        if !self.controller.start_transfer(self.engine.clone(), request) {
            self.state.log("⚠️ Another operation is still running.");
        }
    }

    /// "Pull From Phone (ADB)"
    pub fn pull_from_phone(&mut self) {
        info!("Starting device pull");
        if !self.controller.start_pull(self.bridge.clone()) {
            self.state.log("⚠️ Another operation is still running.");
        }
    }

    fn poll_events(&mut self) {
        for event in self.controller.drain_events() {
            if event.is_completion() {
                debug!("Background operation finished");
            }
            self.state.apply_event(event);
        }
    }

    fn browse(current: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new();
        let current = Path::new(current.trim());
        if current.is_dir() {
            dialog = dialog.set_directory(current);
        }
        dialog.pick_folder()
    }

    fn open_last_folder(&mut self) {
        let Some(outcome) = &self.state.last_outcome else {
            return;
        };
        let folder = outcome.dated_folder.clone();
        if let Err(e) = open::that(&folder) {
            warn!("Failed to open {}: {}", folder.display(), e);
            self.state
                .log(format!("❌ Could not open {}: {}", folder.display(), e));
        }
    }

    fn path_row(ui: &mut egui::Ui, label: &str, value: &mut String, enabled: bool) {
        ui.label(label);
        ui.horizontal(|ui| {
            let browse_width = 70.0;
            let field_width = ui.available_width() - browse_width - ui.spacing().item_spacing.x;
            ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(value).desired_width(field_width),
            );
            if ui
                .add_enabled(enabled, egui::Button::new("Browse").min_size(egui::vec2(browse_width, 0.0)))
                .clicked()
            {
                if let Some(folder) = Self::browse(value) {
                    *value = folder.display().to_string();
                }
            }
        });
    }

    fn action_button(text: &str, fill: Color32, height: f32) -> egui::Button<'static> {
        egui::Button::new(RichText::new(text.to_string()).color(Color32::WHITE).strong())
            .fill(fill)
            .min_size(egui::vec2(200.0, height))
    }
}

impl eframe::App for AutoDropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        let idle = !self.controller.is_busy();
        if !idle {
            // Keep the spinner moving between worker events
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            Self::path_row(ui, "Source Folder:", &mut self.state.source, idle);
            ui.add_space(6.0);
            Self::path_row(ui, "Destination Folder:", &mut self.state.destination, idle);
            ui.add_space(8.0);

            ui.add_enabled(
                idle,
                egui::Checkbox::new(&mut self.state.move_files, "Move instead of Copy"),
            );
            ui.add_space(8.0);

            let mut pull_clicked = false;
            let mut transfer_clicked = false;
            ui.vertical_centered(|ui| {
                pull_clicked = ui
                    .add_enabled(idle, Self::action_button("Pull From Phone (ADB)", PULL_BUTTON, 28.0))
                    .clicked();
                ui.add_space(4.0);
                transfer_clicked = ui
                    .add_enabled(idle, Self::action_button("Start Transfer", TRANSFER_BUTTON, 40.0))
                    .clicked();
                if !idle {
                    ui.spinner();
                }
            });
            if pull_clicked {
                self.pull_from_phone();
            }
            if transfer_clicked {
                self.start_transfer();
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let has_folder = self.state.last_outcome.is_some();
                if ui
                    .add_enabled(has_folder, egui::Button::new("Open Folder"))
                    .clicked()
                {
                    self.open_last_folder();
                }
                if ui.button("Clear Log").clicked() {
                    self.state.log.clear();
                }
            });
            ui.add_space(4.0);

            egui::Frame::none()
                .fill(LOG_BG)
                .inner_margin(egui::Margin::same(8.0))
                .rounding(4.0)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in &self.state.log {
                                ui.label(RichText::new(line).monospace().color(LOG_FG));
                            }
                        });
                });
        });
    }
}
