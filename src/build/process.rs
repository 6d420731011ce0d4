//! Spawning the tool with stdout and stderr merged into one pipe

use std::io::{self, PipeReader};
use std::process::{Child, Command, Stdio};

use tracing::warn;

/// Spawn `args[0]` with the remaining tokens, both output streams writing
/// into the returned reader
pub fn spawn_merged(args: &[String]) -> io::Result<(Child, PipeReader)> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

    let (reader, writer) = io::pipe()?;
    let writer_err = writer.try_clone()?;

    let mut command = Command::new(program);
    command
        .args(rest)
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(writer_err);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(crate::constants::build::CREATE_NO_WINDOW);
    }

    let child = command.spawn()?;

    // The command keeps its copies of the write end; drop them so EOF arrives
    // when the child exits.
    drop(command);
    Ok((child, reader))
}

/// Ask the process to stop: SIGTERM where available, hard kill otherwise
pub fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        match kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM) {
            Ok(()) => return,
            Err(err) => warn!(pid = child.id(), error = %err, "SIGTERM failed, killing"),
        }
    }

    if let Err(err) = child.kill() {
        warn!(pid = child.id(), error = %err, "Failed to kill build process");
    }
}
