//! Editable lists of extra files, folders and hidden modules

use eframe::egui;
use std::collections::BTreeSet;

use crate::gui::constants::*;
use crate::options::OptionState;

/// State for one list: pending entry text and selected rows
pub struct InclusionList {
    id: &'static str,
    title: &'static str,
    hint: &'static str,
    pending: String,
    selected: BTreeSet<usize>,
}

impl InclusionList {
    pub fn new(id: &'static str, title: &'static str, hint: &'static str) -> Self {
        Self {
            id,
            title,
            hint,
            pending: String::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Drop any selection, e.g. after the list was replaced wholesale
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, items: &mut Vec<String>) -> bool {
        let mut changed = false;

        ui.vertical(|ui| {
            ui.label(self.title);

            egui::ScrollArea::vertical()
                .id_salt(self.id)
                .max_height(LIST_HEIGHT)
                .min_scrolled_height(LIST_HEIGHT)
                .show(ui, |ui| {
                    for (idx, item) in items.iter().enumerate() {
                        let is_selected = self.selected.contains(&idx);
                        if ui.selectable_label(is_selected, item).clicked() {
                            if is_selected {
                                self.selected.remove(&idx);
                            } else {
                                self.selected.insert(idx);
                            }
                        }
                    }

                    if items.is_empty() {
                        ui.label(egui::RichText::new("(empty)").italics().weak());
                    }
                });

            ui.add_space(ITEM_SPACING / 2.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.pending)
                    .hint_text(self.hint)
                    .desired_width(f32::INFINITY),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.horizontal(|ui| {
                if (ui.button("➕ Add").clicked() || submitted) && !self.pending.trim().is_empty() {
                    items.push(self.pending.trim().to_string());
                    self.pending.clear();
                    changed = true;
                }

                let has_selection = !self.selected.is_empty();
                if ui
                    .add_enabled(has_selection, egui::Button::new("🗑 Remove Selected"))
                    .clicked()
                {
                    remove_indices(items, &self.selected);
                    self.selected.clear();
                    changed = true;
                }
            });
        });

        changed
    }
}

/// Remove the rows at `indices`, keeping the order of the rest
pub fn remove_indices(items: &mut Vec<String>, indices: &BTreeSet<usize>) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !indices.contains(&idx);
        idx += 1;
        keep
    });
}

/// The three inclusion lists side by side
pub struct InclusionLists {
    files: InclusionList,
    folders: InclusionList,
    modules: InclusionList,
}

impl InclusionLists {
    pub fn new() -> Self {
        Self {
            files: InclusionList::new("included_files", "Include Files:", "File path"),
            folders: InclusionList::new("included_folders", "Include Folders:", "Folder path"),
            modules: InclusionList::new(
                "included_modules",
                "Include Modules:",
                "Module name (e.g. PySide6.QtXml)",
            ),
        }
    }

    pub fn clear_selection(&mut self) {
        self.files.clear_selection();
        self.folders.clear_selection();
        self.modules.clear_selection();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, options: &mut OptionState) -> bool {
        let mut changed = false;

        ui.group(|ui| {
            ui.label(egui::RichText::new("Include Additional Files, Folders, Modules").strong());
            ui.add_space(ITEM_SPACING);

            ui.columns(3, |columns| {
                changed |= self.files.ui(&mut columns[0], &mut options.included_files);
                changed |= self.folders.ui(&mut columns[1], &mut options.included_folders);
                changed |= self.modules.ui(&mut columns[2], &mut options.included_modules);
            });
        });

        changed
    }
}

impl Default for InclusionLists {
    fn default() -> Self {
        Self::new()
    }
}
