//! Input/output paths and compilation options

use eframe::egui;

use crate::gui::constants::*;
use crate::options::{available_cores, OptionState};

/// Renders the path fields and returns true if any changes were made
pub fn paths_ui(ui: &mut egui::Ui, options: &mut OptionState) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Input / Output").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("paths_grid")
            .num_columns(2)
            .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
            .show(ui, |ui| {
                ui.label("Python Script (.py):");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut options.script_path)
                        .hint_text("Path to the Python file")
                        .desired_width(f32::INFINITY),
                );
                changed |= response.changed();
                // Same as picking a script: an empty output dir follows it
                if response.lost_focus()
                    && options.output_dir.is_empty()
                    && !options.script_path.is_empty()
                {
                    let script = std::mem::take(&mut options.script_path);
                    options.set_script_path(script);
                    changed = true;
                }
                ui.end_row();

                ui.label("Output Directory:");
                if ui
                    .add(
                        egui::TextEdit::singleline(&mut options.output_dir)
                            .hint_text("Defaults to the script's folder")
                            .desired_width(f32::INFINITY),
                    )
                    .changed()
                {
                    changed = true;
                }
                ui.end_row();
            });
    });

    changed
}

/// Renders the compilation options and returns true if any changes were made
pub fn compilation_ui(ui: &mut egui::Ui, options: &mut OptionState) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Compilation Options").strong());
        ui.add_space(ITEM_SPACING);

        changed |= ui
            .checkbox(&mut options.one_file, "One-File Mode (single executable)")
            .changed();
        changed |= ui
            .checkbox(&mut options.no_console, "Disable Console Window")
            .changed();
        changed |= ui
            .checkbox(&mut options.shutdown_on_success, "Close when done")
            .changed();

        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Compilation Cores:");
            egui::ComboBox::from_id_salt("core_count")
                .selected_text(options.core_count.to_string())
                .show_ui(ui, |ui| {
                    for cores in 1..=available_cores() {
                        changed |= ui
                            .selectable_value(&mut options.core_count, cores, cores.to_string())
                            .changed();
                    }
                });
        });

        ui.add_space(ITEM_SPACING);

        ui.label("Icon (.ico):");
        changed |= ui
            .add(
                egui::TextEdit::singleline(&mut options.icon_path)
                    .hint_text("Optional icon file")
                    .desired_width(f32::INFINITY),
            )
            .changed();
    });

    changed
}
