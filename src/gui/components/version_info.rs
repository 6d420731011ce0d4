use eframe::egui;

use crate::gui::constants::*;
use crate::options::OptionState;

pub fn ui(ui: &mut egui::Ui, options: &mut OptionState) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Windows Version Information").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("version_info_grid")
            .num_columns(2)
            .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
            .show(ui, |ui| {
                let fields: [(&str, &mut String); 5] = [
                    ("Product Name:", &mut options.product_name),
                    ("Product Version:", &mut options.product_version),
                    ("File Version:", &mut options.file_version),
                    ("File Description:", &mut options.file_description),
                    ("Copyright:", &mut options.copyright),
                ];

                for (label, value) in fields {
                    ui.label(label);
                    changed |= ui.text_edit_singleline(value).changed();
                    ui.end_row();
                }
            });
    });

    changed
}
