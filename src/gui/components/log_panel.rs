//! Compilation log with elapsed time header

use eframe::egui;
use std::ops::Range;

use crate::gui::constants::*;

pub struct LogPanel {
    lines: Vec<String>,
    elapsed: String,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            elapsed: "00:00:00".to_string(),
        }
    }

    /// Append text, one entry per line
    pub fn append(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
        if text.is_empty() {
            self.lines.push(String::new());
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn set_elapsed(&mut self, elapsed: String) {
        self.elapsed = elapsed;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines in `rows`, clamped to what is logged
    fn visible(&self, rows: Range<usize>) -> &[String] {
        let end = rows.end.min(self.lines.len());
        &self.lines[rows.start.min(end)..end]
    }

    pub fn ui(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Compilation Log").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Elapsed Time: {}", self.elapsed));
                });
            });

            let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
            egui::ScrollArea::both()
                .id_salt("compilation_log")
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .min_scrolled_height(LOG_MIN_HEIGHT)
                .show_rows(ui, row_height, self.lines.len(), |ui, rows| {
                    for line in self.visible(rows) {
                        ui.label(egui::RichText::new(line).monospace());
                    }
                });
        });
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_splits_lines() {
        let mut log = LogPanel::new();
        log.append("--- PREVIEW COMMAND ---\npyinstaller app.py\n");
        assert_eq!(log.lines(), &["--- PREVIEW COMMAND ---", "pyinstaller app.py"]);
    }

    #[test]
    fn test_append_empty_keeps_blank_line() {
        let mut log = LogPanel::new();
        log.append("");
        assert_eq!(log.lines(), &[""]);
    }

    #[test]
    fn test_clear() {
        let mut log = LogPanel::new();
        log.append("a");
        log.clear();
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_visible_rows_clamped() {
        let mut log = LogPanel::new();
        log.append("a\nb\nc");
        assert_eq!(log.visible(1..3), &["b", "c"]);
        assert_eq!(log.visible(2..10), &["c"]);
        assert!(log.visible(5..8).is_empty());
    }
}
