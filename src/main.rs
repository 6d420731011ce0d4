#![forbid(unsafe_code)]

mod build;
mod cli;
mod command;
mod config;
mod constants;
mod error;
mod gui;
mod icon;
mod options;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::Settings;
use constants::config::ENV_LOG_LEVEL;

#[derive(Parser)]
#[command(name = "py-builder")]
#[command(about = "Build form for packaging Python scripts with PyInstaller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the build form (default)
    Gui {
        /// Profile to load on startup
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Print the command line a profile would run
    Preview {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Run a profile's build without a window
    Build {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Write a profile holding the default values
    InitProfile { path: PathBuf },
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match std::env::var(ENV_LOG_LEVEL)
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn bootstrap_icon(path: &Path) {
    if let Err(e) = icon::ensure_default_icon(path) {
        warn!(path = %path.display(), error = ?e, "Failed to write default icon");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let cli = Cli::parse();
    let settings = Settings::load();
    info!(tool = %settings.tool, tick_ms = settings.tick_interval_ms, "Settings loaded");

    match cli.command {
        None => {
            bootstrap_icon(&settings.icon_file);
            gui::run_gui(settings, None)?;
        }
        Some(Commands::Gui { profile }) => {
            bootstrap_icon(&settings.icon_file);
            gui::run_gui(settings, profile)?;
        }
        Some(Commands::Preview { profile }) => cli::preview(&settings, &profile)?,
        Some(Commands::Build { profile }) => {
            bootstrap_icon(&settings.icon_file);
            let code = cli::build(&settings, &profile)?;
            std::process::exit(code);
        }
        Some(Commands::InitProfile { path }) => cli::init_profile(&path)?,
    }

    Ok(())
}
