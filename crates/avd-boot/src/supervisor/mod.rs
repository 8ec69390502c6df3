//! Boot supervision for detached emulator processes.
//!
//! A boot attempt moves from `Starting` to exactly one of three terminal
//! states:
//! - `Ready`: the readiness marker appeared in the log, or the launcher exited
//!   cleanly.
//! - `AlreadyRunning`: the launch was rejected because another instance holds
//!   the virtual device.
//! - `Failed`: any other rejection, surfaced as [`BootError::SpawnFailed`].
//!
//! The emulator is never killed once the attempt resolves; it keeps running
//! as a background service and is reaped by a detached thread when it exits.
//! No timeout is enforced here. Callers needing one should run
//! [`BootSupervisor::boot`] on their own thread and race it against a timer.

mod sink;
mod spawn;

use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use avd_config::{Config, DEFAULT_POLL_INTERVAL_MS, default_log_dir};
use strum::Display;
use tracing::{debug, error, info};

use crate::BOOT_TARGET;
use crate::args::build_launch_args;
use crate::error::{BootError, SpawnCause};
use crate::exec::render_command;
use crate::request::BootRequest;
use crate::watcher::LogWatcher;

pub use sink::LogSink;
use spawn::{reap_in_background, spawn_detached};

/// Output written when another emulator already owns the virtual device.
pub const ALREADY_RUNNING_MARKER: &str =
    "There's another emulator instance running with the current AVD";

/// Successful resolution of a boot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BootOutcome {
    /// The emulator is up and serving ADB.
    #[strum(to_string = "ready")]
    Ready,
    /// Another emulator instance already holds the virtual device.
    #[strum(to_string = "already running")]
    AlreadyRunning,
}

impl BootOutcome {
    /// Whether this attempt booted a fresh emulator instance.
    #[must_use]
    pub const fn is_cold_boot(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Launches emulators and waits for them to report readiness.
#[derive(Debug, Clone)]
pub struct BootSupervisor {
    binary: PathBuf,
    log_dir: PathBuf,
    poll_interval: Duration,
}

impl BootSupervisor {
    /// Supervisor for `binary`, logging into the working directory.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            log_dir: default_log_dir().to_path_buf(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Supervisor using the configured binary, log directory, and interval.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.emulator_binary())
            .with_log_dir(config.log_dir())
            .with_poll_interval(config.poll_interval())
    }

    /// Directory receiving per-attempt log files.
    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Interval used both for log polling and for checking the child.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Emulator binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Log file used while booting `request`.
    #[must_use]
    pub fn log_path(&self, request: &BootRequest) -> PathBuf {
        LogSink::path_for(&self.log_dir, request.device_name(), request.port())
    }

    /// Boots the virtual device described by `request`.
    ///
    /// Blocks until the emulator reports readiness or its launch is rejected.
    /// The log file is removed before returning on every path.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::SpawnFailed`] with the captured log when the
    /// emulator cannot start for a reason other than an existing instance,
    /// [`BootError::LogSink`] when the log file cannot be prepared, and
    /// [`BootError::Monitor`] when the child cannot be polled.
    pub fn boot(&self, request: &BootRequest) -> Result<BootOutcome, BootError> {
        let args = build_launch_args(request);
        let path = self.log_path(request);
        let sink = LogSink::create(&path)?;
        let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(1);
        let watcher = LogWatcher::start(&path, self.poll_interval, move || {
            ready_tx.try_send(()).ok();
        })
        .map_err(|source| BootError::LogSink {
            path: path.clone(),
            source,
        })?;
        let mut attempt = BootAttempt::new(sink, watcher);
        let (stdout, stderr) = attempt
            .sink()
            .stdio()
            .map_err(|source| BootError::LogSink { path, source })?;

        debug!(
            target: BOOT_TARGET,
            device = request.device_name(),
            command = %render_command(&self.binary, &args),
            "spawning emulator"
        );
        let race = match spawn_detached(&self.binary, &args, stdout, stderr) {
            Ok(child) => self.race(child, &ready_rx)?,
            Err(source) => Race::Rejected(SpawnCause::Launch(source)),
        };
        let output = attempt.detach();
        match race {
            Race::Ready => {
                debug!(target: BOOT_TARGET, stdout = output, "emulator output before readiness");
                info!(target: BOOT_TARGET, device = request.device_name(), "emulator ready");
                Ok(BootOutcome::Ready)
            }
            Race::Rejected(_) if output.contains(ALREADY_RUNNING_MARKER) => {
                info!(
                    target: BOOT_TARGET,
                    device = request.device_name(),
                    "emulator already running for virtual device"
                );
                Ok(BootOutcome::AlreadyRunning)
            }
            Race::Rejected(cause) => {
                error!(
                    target: BOOT_TARGET,
                    device = request.device_name(),
                    %cause,
                    stderr = output,
                    "emulator failed to boot"
                );
                Err(BootError::SpawnFailed {
                    binary: self.binary.clone(),
                    cause,
                    output: output.to_owned(),
                })
            }
        }
    }

    /// Waits for whichever comes first: the readiness signal or the child
    /// exiting. A child still running at readiness is handed to a reaper
    /// thread and never killed.
    fn race(&self, mut child: Child, ready: &Receiver<()>) -> Result<Race, BootError> {
        debug!(target: BOOT_TARGET, child_pid = child.id(), "emulator spawned");
        loop {
            match ready.recv_timeout(self.poll_interval) {
                Ok(()) => {
                    reap_in_background(child);
                    return Ok(Race::Ready);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.poll_interval),
            }
            let status = child
                .try_wait()
                .map_err(|source| BootError::Monitor { source })?;
            if let Some(status) = status {
                if status.success() {
                    return Ok(Race::Ready);
                }
                return Ok(Race::Rejected(SpawnCause::Exited {
                    code: status.code(),
                }));
            }
        }
    }
}

enum Race {
    Ready,
    Rejected(SpawnCause),
}

/// Resources held for the duration of one attempt.
///
/// `detach` stops the watcher and releases the log exactly once; dropping the
/// attempt on an early return runs the same cleanup.
struct BootAttempt {
    sink: LogSink,
    watcher: Option<LogWatcher>,
}

impl BootAttempt {
    fn new(sink: LogSink, watcher: LogWatcher) -> Self {
        Self {
            sink,
            watcher: Some(watcher),
        }
    }

    fn sink(&self) -> &LogSink {
        &self.sink
    }

    fn detach(&mut self) -> &str {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.sink.release()
    }
}

impl Drop for BootAttempt {
    fn drop(&mut self) {
        self.detach();
    }
}
