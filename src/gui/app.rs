//! Builder window implemented with egui/eframe

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tracing::{error, info, warn};

use super::components::{inclusion_lists::InclusionLists, log_panel::LogPanel, options_form, version_info};
use super::constants::*;
use crate::build::{BuildEvent, BuildSupervisor};
use crate::command;
use crate::config::{profile, Settings};
use crate::constants::icon::SIZE as ICON_SIZE;
use crate::options::OptionState;

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

/// Modal error shown until dismissed
struct ErrorDialog {
    title: String,
    message: String,
}

struct BuilderApp {
    options: OptionState,
    settings: Settings,
    supervisor: BuildSupervisor,
    events_tx: Sender<BuildEvent>,
    events_rx: Receiver<BuildEvent>,
    log: LogPanel,
    inclusions: InclusionLists,
    profile_path: String,
    status_message: Option<StatusMessage>,
    error_dialog: Option<ErrorDialog>,
    show_close_confirm: bool,
    allow_close: bool,
    /// Set from a successful start until `Finished` or `Cancelled` is received
    building: bool,
}

impl BuilderApp {
    fn new(_cc: &CreationContext<'_>, settings: Settings, options: OptionState, profile_path: Option<PathBuf>) -> Self {
        info!("Initializing builder window");
        Self::with_state(settings, options, profile_path)
    }

    fn with_state(settings: Settings, options: OptionState, profile_path: Option<PathBuf>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let profile_path = profile_path
            .or_else(|| settings.last_profile.clone())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            options,
            supervisor: BuildSupervisor::new(settings.tick_interval()),
            settings,
            events_tx,
            events_rx,
            log: LogPanel::new(),
            inclusions: InclusionLists::new(),
            profile_path,
            status_message: None,
            error_dialog: None,
            show_close_confirm: false,
            allow_close: false,
            building: false,
        }
    }

    fn show_error(&mut self, title: &str, message: impl Into<String>) {
        self.error_dialog = Some(ErrorDialog {
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn set_status(&mut self, text: impl Into<String>, color: egui::Color32) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            color,
        });
    }

    fn compile(&mut self) -> Option<Vec<String>> {
        match command::compile_with_tool(&self.options, &self.settings.tool) {
            Ok(args) => Some(args),
            Err(err) => {
                warn!(error = %err, "Command not compiled");
                self.show_error("Python script not selected!", err.to_string());
                None
            }
        }
    }

    fn preview_command(&mut self) {
        if let Some(args) = self.compile() {
            let line = command::preview(&args);
            self.log.append(&format!(
                "--- PREVIEW COMMAND ---\n{line}\n-----------------------\n"
            ));
        }
    }

    fn start_build(&mut self) {
        let Some(args) = self.compile() else {
            return;
        };

        if self.building || self.supervisor.is_running() {
            self.show_error("Build in Progress", "A build is already running. Please wait.");
            return;
        }

        self.log.clear();
        self.log.append("Starting compilation...\n");
        self.log.set_elapsed(crate::build::format_elapsed(Duration::ZERO));

        match self.supervisor.start(args, self.events_tx.clone()) {
            // Dropping the handle detaches the worker; events arrive on the channel
            Ok(_handle) => {
                self.building = true;
                self.set_status("Compiling...", STATUS_BUSY);
            }
            Err(err) => self.show_error("Build in Progress", err.to_string()),
        }
    }

    fn cancel_build(&mut self) {
        if self.supervisor.request_cancel() {
            self.set_status("Compilation cancelled", STATUS_ERROR);
        }
    }

    fn poll_build_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                BuildEvent::Output(line) => self.log.append(&line),
                BuildEvent::Elapsed(elapsed) => self.log.set_elapsed(elapsed),
                BuildEvent::Finished(code) => {
                    self.building = false;
                    self.build_finished(ctx, code);
                }
                BuildEvent::Cancelled => {
                    self.building = false;
                    self.log.append("\n--- COMPILATION CANCELLED ---");
                }
            }
        }
    }

    fn build_finished(&mut self, ctx: &egui::Context, code: i32) {
        if code == 0 {
            self.log.append("\n--- COMPILATION SUCCESSFUL! ---");
            self.set_status("Compilation successful", STATUS_OK);
            if self.options.shutdown_on_success {
                info!("Closing after successful build");
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        } else {
            self.log.append("\n--- COMPILATION FAILED! ---");
            self.set_status(format!("Compilation failed (exit {code})"), STATUS_ERROR);
        }
    }

    fn profile_file(&self) -> Option<PathBuf> {
        let trimmed = self.profile_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    fn remember_profile(&mut self, path: PathBuf) {
        self.settings.last_profile = Some(path);
        if let Err(err) = self.settings.save() {
            warn!(error = ?err, "Failed to remember last profile");
        }
    }

    fn save_profile(&mut self) {
        let Some(path) = self.profile_file() else {
            self.show_error("Save Error", "Enter a profile path first.");
            return;
        };

        match profile::save(&self.options, &path) {
            Ok(()) => {
                self.log.append(&format!("Profile saved to: {}", path.display()));
                self.remember_profile(path);
            }
            Err(err) => {
                error!(error = %err, "Failed to save profile");
                self.show_error("Save Error", format!("Failed to save profile: {err}"));
            }
        }
    }

    fn load_profile(&mut self) {
        let Some(path) = self.profile_file() else {
            self.show_error("Load Error", "Enter a profile path first.");
            return;
        };

        match profile::load(&path) {
            Ok(options) => {
                self.options = options;
                self.inclusions.clear_selection();
                self.log.append(&format!("Profile loaded from: {}", path.display()));
                self.remember_profile(path);
            }
            Err(err) => {
                error!(error = %err, "Failed to load profile");
                self.show_error(
                    "Load Error",
                    format!("Failed to load or parse profile file: {err}"),
                );
            }
        }
    }

    fn reset_ui(&mut self) {
        self.options.reset();
        self.inclusions.clear_selection();
        self.log.append("UI has been reset to default values.");
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        if self.allow_close || !self.building {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        self.show_close_confirm = true;
    }

    fn bottom_buttons(&mut self, ui: &mut egui::Ui) {
        let running = self.building;

        ui.horizontal(|ui| {
            ui.label("Profile:");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(&mut self.profile_path)
                    .hint_text(format!("profile.{}", crate::constants::config::PROFILE_EXTENSION))
                    .desired_width(260.0),
            );
            if ui.add_enabled(!running, egui::Button::new("📂 Load Profile")).clicked() {
                self.load_profile();
            }
            if ui.add_enabled(!running, egui::Button::new("💾 Save Profile")).clicked() {
                self.save_profile();
            }
        });

        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            if ui.add_enabled(!running, egui::Button::new("🔄 Reload UI")).clicked() {
                self.reset_ui();
            }
            if ui.add_enabled(!running, egui::Button::new("👁 Preview Command")).clicked() {
                self.preview_command();
            }
            if ui.button("🧹 Clear Log").clicked() {
                self.log.clear();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if running {
                    let cancel = egui::Button::new(
                        egui::RichText::new("Compiling... (Cancel)").color(egui::Color32::WHITE),
                    )
                    .fill(CANCEL_FILL);
                    if ui.add(cancel).clicked() {
                        self.cancel_build();
                    }
                } else {
                    let start = egui::Button::new(
                        egui::RichText::new("Start Compilation").color(egui::Color32::WHITE),
                    )
                    .fill(START_FILL);
                    if ui.add(start).clicked() {
                        self.start_build();
                    }
                }
            });
        });
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if let Some(dialog) = &self.error_dialog {
            let mut dismissed = false;
            egui::Window::new(dialog.title.as_str())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(STATUS_ERROR, dialog.message.as_str());
                    ui.add_space(ITEM_SPACING);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.error_dialog = None;
            }
        }

        if self.show_close_confirm {
            egui::Window::new("Confirm Exit")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("A build is currently in progress. Are you sure you want to exit?");
                    ui.add_space(ITEM_SPACING);
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            info!("Exit confirmed during build, cancelling");
                            self.supervisor.request_cancel();
                            self.allow_close = true;
                            self.show_close_confirm = false;
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                        if ui.button("No").clicked() {
                            self.show_close_confirm = false;
                        }
                    });
                });
        }
    }
}

impl eframe::App for BuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_build_events(ctx);
        self.handle_close_request(ctx);

        let running = self.building;

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(PADDING);
            self.bottom_buttons(ui);
            if let Some(message) = &self.status_message {
                ui.colored_label(message.color, message.text.as_str());
            }
            ui.add_space(PADDING);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("form")
                .max_height(ui.available_height() * 0.6)
                .show(ui, |ui| {
                    ui.add_enabled_ui(!running, |ui| {
                        options_form::paths_ui(ui, &mut self.options);
                        ui.add_space(SECTION_SPACING);

                        ui.columns(2, |columns| {
                            options_form::compilation_ui(&mut columns[0], &mut self.options);
                            version_info::ui(&mut columns[1], &mut self.options);
                        });
                        ui.add_space(SECTION_SPACING);

                        self.inclusions.ui(ui, &mut self.options);
                    });
                });

            ui.add_space(SECTION_SPACING);
            self.log.ui(ui);
        });

        self.dialogs(ctx);

        // Events can land after the last input; keep polling the channel
        ctx.request_repaint_after(Duration::from_millis(EVENT_POLL_INTERVAL_MS));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.supervisor.request_cancel() {
            warn!("Build cancelled on exit");
        }
        info!("Builder exiting");
    }
}

fn window_icon() -> egui::IconData {
    egui::IconData {
        rgba: crate::icon::default_icon_rgba(),
        width: ICON_SIZE,
        height: ICON_SIZE,
    }
}

/// Open the builder window, optionally preloaded from a profile
pub fn run_gui(settings: Settings, profile_path: Option<PathBuf>) -> Result<()> {
    let options = match profile_path.as_deref() {
        Some(path) => profile::load(path)?,
        None => OptionState::default(),
    };

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title(WINDOW_TITLE)
            .with_icon(Arc::new(window_icon())),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| Ok(Box::new(BuilderApp::new(cc, settings, options, profile_path)))),
    )
    .map_err(|err| anyhow!("Failed to launch builder window: {err}"))
}
