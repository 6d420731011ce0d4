//! Events published by a running build

use std::time::Duration;

/// Messages sent from the build thread to whoever owns the receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// One line of combined stdout/stderr, trailing whitespace trimmed
    Output(String),

    /// Elapsed wall-clock time formatted as `HH:MM:SS`
    Elapsed(String),

    /// Process exited (or could not be launched) with this code
    Finished(i32),

    /// Build was cancelled by the user; no `Finished` follows
    Cancelled,
}

/// Format a duration as `HH:MM:SS` (hours keep counting past 99)
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, remainder) = (total / 3600, total % 3600);
    let (minutes, seconds) = (remainder / 60, remainder % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
