//! Headless front end: preview, build and profile bootstrap without a window

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::build::{BuildEvent, BuildSupervisor};
use crate::command;
use crate::config::{profile, Settings};
use crate::constants::build::{CANCELLED_EXIT_CODE, INTERRUPT_POLL_MS, NO_EXIT_CODE};
use crate::options::OptionState;

fn compile_profile(settings: &Settings, profile_path: &Path) -> Result<Vec<String>> {
    let options = profile::load(profile_path)?;
    let args = command::compile_with_tool(&options, &settings.tool)
        .with_context(|| format!("Cannot build profile {}", profile_path.display()))?;
    Ok(args)
}

pub fn preview(settings: &Settings, profile_path: &Path) -> Result<()> {
    let args = compile_profile(settings, profile_path)?;
    println!("{}", command::preview(&args));
    Ok(())
}

/// Write a profile holding the default form values
pub fn init_profile(path: &Path) -> Result<()> {
    profile::save(&OptionState::default(), path)?;
    println!("Profile saved to: {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&flag)) {
            warn!(signal, error = %e, "Failed to register signal handler");
        }
    }
    flag
}

#[cfg(not(unix))]
fn interrupt_flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

/// Run a build to completion and return the tool's exit code
pub fn build(settings: &Settings, profile_path: &Path) -> Result<i32> {
    build_until(settings, profile_path, &interrupt_flag())
}

/// Run a build, cancelling it once `interrupted` is raised
fn build_until(settings: &Settings, profile_path: &Path, interrupted: &AtomicBool) -> Result<i32> {
    let args = compile_profile(settings, profile_path)?;
    let supervisor = BuildSupervisor::new(settings.tick_interval());
    let (tx, rx) = mpsc::channel();

    println!("Starting compilation...");
    let _handle = supervisor.start(args, tx)?;

    let mut cancel_sent = false;
    loop {
        // Checked on every event, not only on timeouts
        if !cancel_sent && interrupted.load(Ordering::Relaxed) {
            info!("Interrupt received, cancelling build");
            cancel_sent = true;
            supervisor.request_cancel();
        }

        match rx.recv_timeout(Duration::from_millis(INTERRUPT_POLL_MS)) {
            Ok(BuildEvent::Output(line)) => println!("{line}"),
            Ok(BuildEvent::Elapsed(elapsed)) => eprintln!("Elapsed Time: {elapsed}"),
            Ok(BuildEvent::Finished(code)) => {
                if code == 0 {
                    println!("\n--- COMPILATION SUCCESSFUL! ---");
                } else {
                    println!("\n--- COMPILATION FAILED! ---");
                }
                return Ok(code);
            }
            Ok(BuildEvent::Cancelled) => {
                println!("\n--- COMPILATION CANCELLED ---");
                return Ok(CANCELLED_EXIT_CODE);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Build worker exited without a result");
                return Ok(NO_EXIT_CODE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_profile_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.mpb");
        init_profile(&path).unwrap();

        let loaded = profile::load(&path).unwrap();
        assert_eq!(loaded, OptionState::default());
    }

    #[test]
    fn test_preview_requires_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mpb");
        init_profile(&path).unwrap();

        assert!(preview(&Settings::default(), &path).is_err());
    }

    #[cfg(unix)]
    fn profile_for(dir: &Path) -> std::path::PathBuf {
        let script = dir.join("app.py");
        std::fs::write(&script, "print('hi')\n").unwrap();

        let mut options = OptionState::default();
        options.set_script_path(script.to_string_lossy());
        let path = dir.join("app.mpb");
        profile::save(&options, &path).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_build_returns_tool_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = profile_for(dir.path());

        let settings = Settings {
            tool: "false".to_string(),
            ..Settings::default()
        };
        let interrupted = AtomicBool::new(false);
        assert_eq!(build_until(&settings, &path, &interrupted).unwrap(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupt_cancels_chatty_build() {
        use std::os::unix::fs::PermissionsExt;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let path = profile_for(dir.path());

        // Prints far faster than the interrupt poll interval
        let tool = dir.path().join("chatty-tool");
        std::fs::write(&tool, "#!/bin/sh\nwhile true; do echo tick; sleep 0.02; done\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let settings = Settings {
            tool: tool.to_string_lossy().into_owned(),
            ..Settings::default()
        };
        let interrupted = Arc::new(AtomicBool::new(false));

        let (done_tx, done_rx) = mpsc::channel();
        let flag = Arc::clone(&interrupted);
        thread::spawn(move || {
            let _ = done_tx.send(build_until(&settings, &path, &flag).unwrap());
        });

        thread::sleep(Duration::from_millis(500));
        interrupted.store(true, Ordering::Relaxed);

        let code = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(code, CANCELLED_EXIT_CODE);
    }
}
