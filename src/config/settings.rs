//! Application settings (tool location, refresh rate, last profile)
//!
//! Stored as JSON under the platform config directory. Environment
//! variables override the file after loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::constants::build::{DEFAULT_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};
use crate::constants::{config, icon, pyinstaller};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Executable invoked as argv[0]
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Elapsed time refresh period while building
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Default icon written at startup when absent
    #[serde(default = "default_icon_file")]
    pub icon_file: PathBuf,

    /// Last profile loaded or saved, preselected in the GUI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_profile: Option<PathBuf>,
}

fn default_tool() -> String {
    pyinstaller::TOOL.to_string()
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_icon_file() -> PathBuf {
    PathBuf::from(icon::DEFAULT_FILENAME)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            tick_interval_ms: default_tick_interval_ms(),
            icon_file: default_icon_file(),
            last_profile: None,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    /// Load from the default location, creating it with defaults if missing
    ///
    /// A broken file is reported and replaced by defaults in memory only.
    pub fn load() -> Self {
        let path = Self::path();
        let mut settings = if path.exists() {
            Self::load_from(&path).unwrap_or_else(|err| {
                error!(path = %path.display(), error = ?err, "Failed to load settings, using defaults");
                Self::default()
            })
        } else {
            info!(path = %path.display(), "Settings file not found, creating default");
            let settings = Self::default();
            if let Err(err) = settings.save_to(&path) {
                warn!(error = ?err, "Failed to write default settings");
            }
            settings
        };

        settings.apply_env_overrides();
        settings.validate_and_clamp();
        settings
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
        settings.validate_and_clamp();
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(tool) = env::var(config::ENV_TOOL) {
            if !tool.trim().is_empty() {
                self.tool = tool.trim().to_string();
            }
        }
        if let Ok(raw) = env::var(config::ENV_TICK_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.tick_interval_ms = ms,
                Err(err) => error!(var = config::ENV_TICK_MS, error = ?err, "failed to parse env var"),
            }
        }
    }

    fn validate_and_clamp(&mut self) {
        if self.tool.trim().is_empty() {
            warn!("tool is empty, using default");
            self.tool = default_tool();
        }

        let clamped = self.tick_interval_ms.clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
        if clamped != self.tick_interval_ms {
            warn!(tick_interval_ms = self.tick_interval_ms, using = clamped, "tick_interval_ms out of range, clamping");
            self.tick_interval_ms = clamped;
        }
    }
}
