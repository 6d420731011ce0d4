//! GUI-specific constants for layout, status colors and intervals

use egui;

/// Builder window dimensions
pub const WINDOW_WIDTH: f32 = 900.0;
pub const WINDOW_HEIGHT: f32 = 860.0;
pub const WINDOW_MIN_WIDTH: f32 = 640.0;
pub const WINDOW_MIN_HEIGHT: f32 = 600.0;

pub const WINDOW_TITLE: &str = "Python Builder";

/// Layout spacing
pub const PADDING: f32 = 8.0;
pub const SECTION_SPACING: f32 = 12.0;
pub const ITEM_SPACING: f32 = 6.0;

/// Inclusion list and log sizes
pub const LIST_HEIGHT: f32 = 110.0;
pub const LOG_MIN_HEIGHT: f32 = 160.0;

/// Status colors
pub const STATUS_OK: egui::Color32 = egui::Color32::from_rgb(0, 200, 0);
pub const STATUS_ERROR: egui::Color32 = egui::Color32::from_rgb(220, 50, 40);
pub const STATUS_BUSY: egui::Color32 = egui::Color32::from_rgb(200, 200, 0);

/// Start/cancel button fills
pub const START_FILL: egui::Color32 = egui::Color32::from_rgb(0x4C, 0xAF, 0x50);
pub const CANCEL_FILL: egui::Color32 = egui::Color32::from_rgb(0xF4, 0x43, 0x36);

/// Event polling while a build runs
pub const EVENT_POLL_INTERVAL_MS: u64 = 100;
