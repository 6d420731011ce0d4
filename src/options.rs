//! Option state edited by the form
//!
//! Plain record of everything the user can choose before a build. The
//! command compiler reads it, the profile store loads and saves it, and only
//! the interactive front end mutates it.

use std::path::Path;

/// Number of cores the host exposes (at least one)
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionState {
    pub script_path: String,
    pub output_dir: String,
    pub icon_path: String,

    pub one_file: bool,
    pub no_console: bool,
    pub shutdown_on_success: bool,
    pub core_count: usize,

    // Windows version information
    pub product_name: String,
    pub product_version: String,
    pub file_version: String,
    pub file_description: String,
    pub copyright: String,

    pub included_files: Vec<String>,
    pub included_folders: Vec<String>,
    pub included_modules: Vec<String>,
}

impl Default for OptionState {
    fn default() -> Self {
        Self {
            script_path: String::new(),
            output_dir: String::new(),
            icon_path: String::new(),
            one_file: false,
            no_console: false,
            shutdown_on_success: false,
            core_count: available_cores(),
            product_name: String::new(),
            product_version: String::new(),
            file_version: String::new(),
            file_description: String::new(),
            copyright: String::new(),
            included_files: Vec::new(),
            included_folders: Vec::new(),
            included_modules: Vec::new(),
        }
    }
}

impl OptionState {
    /// Restore every field to its default value
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keep core_count within [1, available cores]
    pub fn clamp_core_count(&mut self) {
        self.core_count = self.core_count.clamp(1, available_cores());
    }

    /// Set the script and fill an empty output directory with its parent
    pub fn set_script_path(&mut self, path: impl Into<String>) {
        self.script_path = path.into();
        if self.output_dir.is_empty() {
            if let Some(parent) = Path::new(&self.script_path).parent() {
                self.output_dir = parent.to_string_lossy().into_owned();
            }
        }
    }
}
