//! Build supervisor: runs one PyInstaller process at a time in the background
//!
//! The interactive thread hands over a compiled argv and a channel sender.
//! A worker thread spawns the process, streams its merged output line by
//! line, and reports the exit code. A second thread publishes elapsed time
//! while the job is alive.
//!
//! Cancellation is forceful: the process gets SIGTERM and the worker thread
//! is abandoned. Nothing else is published for that job after
//! [`BuildEvent::Cancelled`]; output still in the pipe is dropped.

mod events;
mod process;

pub use events::{format_elapsed, BuildEvent};

use std::io::{BufRead, BufReader, ErrorKind};
use std::process::Child;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::constants::build::{
    DEFAULT_TICK_INTERVAL_MS, LAUNCH_FAILURE_CODE, NO_EXIT_CODE, REAP_POLL_MS,
};
use crate::error::ValidationError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the supervisor, the worker thread and the ticker
struct JobShared {
    alive: AtomicBool,
    cancelled: AtomicBool,
    /// Kept until the process is reaped so cancellation can signal it
    child: Mutex<Option<Child>>,
    /// Dropping the sender stops the elapsed ticker
    stop_ticker: Mutex<Option<Sender<()>>>,
    /// Publishing and cancelling both go through this lock, so no output
    /// can be sent after `Cancelled`
    events: Mutex<Sender<BuildEvent>>,
}

impl JobShared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Send an event unless the job was cancelled
    fn publish(&self, event: BuildEvent) -> bool {
        let events = lock(&self.events);
        if self.is_cancelled() {
            return false;
        }
        events.send(event).is_ok()
    }

    fn publish_elapsed(&self, started: Instant) {
        let _ = lock(&self.events).send(BuildEvent::Elapsed(format_elapsed(started.elapsed())));
    }

    fn stop_ticker(&self) {
        lock(&self.stop_ticker).take();
    }

    fn cancel(&self) {
        {
            let events = lock(&self.events);
            self.cancelled.store(true, Ordering::SeqCst);
            self.alive.store(false, Ordering::SeqCst);
            let _ = events.send(BuildEvent::Cancelled);
        }

        if let Some(child) = lock(&self.child).as_mut() {
            info!(pid = child.id(), "Terminating build process");
            process::terminate(child);
        }
        self.stop_ticker();
    }
}

/// Handle to a started build
pub struct BuildJobHandle {
    worker: JoinHandle<()>,
    shared: Arc<JobShared>,
}

impl BuildJobHandle {
    /// True until the job finished or was cancelled
    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::SeqCst)
    }

    /// Block until the worker thread is done
    ///
    /// For a cancelled job this returns only once the process' output pipe
    /// closes, which may be never if a grandchild keeps it open.
    pub fn wait(self) {
        if self.worker.join().is_err() {
            error!("Build worker thread panicked");
        }
    }
}

pub struct BuildSupervisor {
    active: Mutex<Option<Arc<JobShared>>>,
    spawned: Arc<AtomicUsize>,
    tick_interval: Duration,
}

impl Default for BuildSupervisor {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }
}

impl BuildSupervisor {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            active: Mutex::new(None),
            spawned: Arc::new(AtomicUsize::new(0)),
            tick_interval,
        }
    }

    /// Whether a build is currently alive
    pub fn is_running(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|job| job.alive.load(Ordering::SeqCst))
    }

    /// Number of processes actually spawned by this supervisor
    pub fn spawn_count(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Start a build of `args`, publishing to `events`
    ///
    /// Fails without side effects if a build is already alive.
    pub fn start(
        &self,
        args: Vec<String>,
        events: Sender<BuildEvent>,
    ) -> Result<BuildJobHandle, ValidationError> {
        // Held across check and creation so two starts cannot both succeed
        let mut active = lock(&self.active);
        if active.as_ref().is_some_and(|job| job.alive.load(Ordering::SeqCst)) {
            warn!("Rejected build start: a build is already running");
            return Err(ValidationError::BuildAlreadyRunning);
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::new(JobShared {
            alive: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
            child: Mutex::new(None),
            stop_ticker: Mutex::new(Some(stop_tx)),
            events: Mutex::new(events),
        });
        *active = Some(Arc::clone(&shared));

        info!(command = ?args, "Starting build");
        let started = Instant::now();
        let ticker = spawn_ticker(Arc::clone(&shared), started, self.tick_interval, stop_rx);

        let worker_shared = Arc::clone(&shared);
        let spawned = Arc::clone(&self.spawned);
        let worker = thread::spawn(move || {
            run_job(&args, &worker_shared, &spawned);
            worker_shared.stop_ticker();
            if ticker.join().is_err() {
                error!("Elapsed ticker thread panicked");
            }
        });

        Ok(BuildJobHandle { worker, shared })
    }

    /// Cancel the running build; returns false if nothing was running
    pub fn request_cancel(&self) -> bool {
        let active = lock(&self.active);
        match active.as_ref() {
            Some(job) if job.alive.load(Ordering::SeqCst) => {
                info!("Build cancellation requested");
                job.cancel();
                true
            }
            _ => false,
        }
    }
}

fn spawn_ticker(
    shared: Arc<JobShared>,
    started: Instant,
    interval: Duration,
    stop: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => shared.publish_elapsed(started),
            // Stopped: one final recomputation
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                shared.publish_elapsed(started);
                break;
            }
        }
    })
}

fn run_job(args: &[String], shared: &JobShared, spawned: &AtomicUsize) {
    let code = supervise(args, shared, spawned);
    if shared.is_cancelled() {
        info!("Cancelled build worker exiting");
        return;
    }

    info!(exit_code = code, "Build finished");
    shared.alive.store(false, Ordering::SeqCst);
    shared.publish(BuildEvent::Finished(code));
}

/// Launch, stream, reap; returns the exit code to report
fn supervise(args: &[String], shared: &JobShared, spawned: &AtomicUsize) -> i32 {
    let tool = args.first().map(String::as_str).unwrap_or_default();

    let reader = match process::spawn_merged(args) {
        Ok((child, reader)) => {
            spawned.fetch_add(1, Ordering::SeqCst);
            info!(pid = child.id(), tool, "Spawned build process");
            let mut slot = lock(&shared.child);
            *slot = Some(child);
            // Cancelled between spawn and here: nobody signalled it yet
            if shared.is_cancelled() {
                if let Some(child) = slot.as_mut() {
                    process::terminate(child);
                }
            }
            reader
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            error!(tool, "Build tool not found");
            shared.publish(BuildEvent::Output(format!("Error: '{tool}' not found.")));
            shared.publish(BuildEvent::Output(
                "Please make sure PyInstaller is installed and in your system's PATH.".to_string(),
            ));
            shared.publish(BuildEvent::Output(
                "You can install it with: pip install pyinstaller".to_string(),
            ));
            return LAUNCH_FAILURE_CODE;
        }
        Err(err) => {
            error!(tool, error = %err, "Failed to launch build process");
            shared.publish(BuildEvent::Output(format!("An error occurred: {err}")));
            return LAUNCH_FAILURE_CODE;
        }
    };

    for line in BufReader::new(reader).split(b'\n') {
        if shared.is_cancelled() {
            break;
        }
        match line {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).trim_end().to_string();
                debug!(line = %text, "build output");
                shared.publish(BuildEvent::Output(text));
            }
            Err(err) => {
                warn!(error = %err, "Failed to read build output");
                break;
            }
        }
    }

    reap(shared)
}

/// Poll the process until it exits
///
/// The child stays in its slot until reaped, so a cancel arriving after the
/// output closed can still signal it.
fn reap(shared: &JobShared) -> i32 {
    loop {
        let polled = {
            let mut slot = lock(&shared.child);
            let Some(child) = slot.as_mut() else {
                return NO_EXIT_CODE;
            };
            match child.try_wait() {
                Ok(None) => None,
                Ok(Some(status)) => {
                    slot.take();
                    Some(Ok(status))
                }
                Err(err) => {
                    slot.take();
                    Some(Err(err))
                }
            }
        };

        match polled {
            None => thread::sleep(Duration::from_millis(REAP_POLL_MS)),
            Some(Ok(status)) => return status.code().unwrap_or(NO_EXIT_CODE),
            Some(Err(err)) => {
                error!(error = %err, "Failed to wait for build process");
                shared.publish(BuildEvent::Output(format!("An error occurred: {err}")));
                return LAUNCH_FAILURE_CODE;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const TEST_TICK: Duration = Duration::from_millis(100);

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn without_elapsed(events: &[BuildEvent]) -> Vec<BuildEvent> {
        events
            .iter()
            .filter(|event| !matches!(event, BuildEvent::Elapsed(_)))
            .cloned()
            .collect()
    }

    fn run_to_end(supervisor: &BuildSupervisor, args: Vec<String>) -> Vec<BuildEvent> {
        let (tx, rx) = mpsc::channel();
        let handle = supervisor.start(args, tx).unwrap();
        handle.wait();
        rx.try_iter().collect()
    }

    fn output(text: &str) -> BuildEvent {
        BuildEvent::Output(text.to_string())
    }

    fn read_pid(path: &std::path::Path) -> i32 {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(pid) = std::fs::read_to_string(path).unwrap_or_default().trim().parse() {
                return pid;
            }
            assert!(Instant::now() < deadline, "process never wrote its pid");
            thread::sleep(Duration::from_millis(20));
        }
    }

    fn process_gone(pid: i32) -> bool {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if kill(Pid::from_raw(pid), None::<Signal>).is_err() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_lines_arrive_in_order_before_terminal() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let events = run_to_end(&supervisor, sh("echo a; echo b; echo c"));
        assert_eq!(without_elapsed(&events), vec![
            output("a"),
            output("b"),
            output("c"),
            BuildEvent::Finished(0),
        ]);
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_stderr_is_merged() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let events = run_to_end(&supervisor, sh("echo out; echo err 1>&2; exit 3"));
        assert_eq!(without_elapsed(&events), vec![
            output("out"),
            output("err"),
            BuildEvent::Finished(3),
        ]);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let events = run_to_end(&supervisor, sh("printf '  indented  \\r\\n'"));
        assert_eq!(without_elapsed(&events), vec![
            output("  indented"),
            BuildEvent::Finished(0),
        ]);
    }

    #[test]
    fn test_missing_tool_reports_synthetic_failure() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let args = vec!["py-builder-no-such-tool".to_string(), "--noconfirm".to_string()];
        let events = without_elapsed(&run_to_end(&supervisor, args));

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], output("Error: 'py-builder-no-such-tool' not found."));
        assert_eq!(events[3], BuildEvent::Finished(LAUNCH_FAILURE_CODE));
        assert_eq!(supervisor.spawn_count(), 0);
    }

    #[test]
    fn test_empty_command_is_launch_failure() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let events = without_elapsed(&run_to_end(&supervisor, Vec::new()));
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], BuildEvent::Output(line) if line.starts_with("An error occurred")));
        assert_eq!(events[1], BuildEvent::Finished(LAUNCH_FAILURE_CODE));
    }

    #[test]
    fn test_second_start_rejected_while_running() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let (tx, _rx) = mpsc::channel();
        let handle = supervisor.start(sh("sleep 1"), tx).unwrap();

        let (tx2, rx2) = mpsc::channel();
        let second = supervisor.start(sh("echo second"), tx2);
        assert!(matches!(second, Err(ValidationError::BuildAlreadyRunning)));

        handle.wait();
        assert_eq!(supervisor.spawn_count(), 1);
        assert!(rx2.try_iter().next().is_none());

        // Free again once the first job is done
        let events = run_to_end(&supervisor, sh("echo again"));
        assert_eq!(without_elapsed(&events), vec![output("again"), BuildEvent::Finished(0)]);
        assert_eq!(supervisor.spawn_count(), 2);
    }

    #[test]
    fn test_elapsed_ticks_and_final_update_follows_terminal() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let events = run_to_end(&supervisor, sh("sleep 0.35"));

        let ticks = events
            .iter()
            .filter(|event| matches!(event, BuildEvent::Elapsed(_)))
            .count();
        assert!(ticks >= 2, "expected periodic ticks plus a final one, got {ticks}");
        assert_eq!(events.last(), Some(&BuildEvent::Elapsed("00:00:00".to_string())));

        let finished_at = events
            .iter()
            .position(|event| matches!(event, BuildEvent::Finished(0)))
            .unwrap();
        assert!(finished_at < events.len() - 1);
        assert!(events[finished_at + 1..]
            .iter()
            .all(|event| matches!(event, BuildEvent::Elapsed(_))));
    }

    #[test]
    fn test_cancel_without_job_is_noop() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        assert!(!supervisor.request_cancel());
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_cancel_running_job() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("pid");
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let (tx, rx) = mpsc::channel();
        let script = format!("echo $$ > '{}'; echo ready; exec sleep 30", pidfile.display());
        let _handle = supervisor.start(sh(&script), tx).unwrap();

        let first = loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                BuildEvent::Elapsed(_) => continue,
                event => break event,
            }
        };
        assert_eq!(first, output("ready"));
        let pid = read_pid(&pidfile);

        assert!(supervisor.request_cancel());
        assert!(!supervisor.is_running());
        assert!(process_gone(pid), "build process {pid} survived cancellation");

        thread::sleep(Duration::from_millis(200));
        let rest: Vec<BuildEvent> = rx.try_iter().collect();
        let rest = without_elapsed(&rest);
        assert_eq!(rest, vec![BuildEvent::Cancelled]);

        // Cancelling twice does nothing
        assert!(!supervisor.request_cancel());
    }

    #[test]
    fn test_cancel_after_output_closed_still_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("pid");
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let (tx, rx) = mpsc::channel();
        let script = format!(
            "echo $$ > '{}'; exec >/dev/null 2>&1; exec sleep 30",
            pidfile.display()
        );
        let handle = supervisor.start(sh(&script), tx).unwrap();
        let pid = read_pid(&pidfile);

        // Let the worker see EOF and start waiting on the process
        thread::sleep(Duration::from_millis(300));
        assert!(supervisor.is_running());

        assert!(supervisor.request_cancel());
        assert!(process_gone(pid), "build process {pid} survived cancellation");

        handle.wait();
        let events: Vec<BuildEvent> = rx.try_iter().collect();
        assert_eq!(without_elapsed(&events), vec![BuildEvent::Cancelled]);
    }

    #[test]
    fn test_start_after_cancel() {
        let supervisor = BuildSupervisor::new(TEST_TICK);
        let (tx, _rx) = mpsc::channel();
        let _handle = supervisor.start(sh("exec sleep 30"), tx).unwrap();
        assert!(supervisor.request_cancel());

        let events = run_to_end(&supervisor, sh("echo next"));
        assert_eq!(without_elapsed(&events), vec![output("next"), BuildEvent::Finished(0)]);
    }
}
