//! Builder window (egui/eframe)

mod app;
mod components;
pub mod constants;

pub use app::run_gui;
