//! Per-attempt log file receiving the emulator's stdout and stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::BOOT_TARGET;
use crate::error::BootError;

/// Log file owned by one boot attempt.
///
/// The file is truncated on creation so output from a crashed earlier run can
/// never satisfy the readiness check. [`LogSink::release`] captures the final
/// contents, closes both write handles, and deletes the file; it runs once and
/// later calls return the same captured text.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    stdout: Option<File>,
    stderr: Option<File>,
    captured: Option<String>,
}

impl LogSink {
    /// Log path for a device, `<dir>/<device>[-<port>].log`.
    #[must_use]
    pub fn path_for(dir: &Path, device_name: &str, port: Option<NonZeroU16>) -> PathBuf {
        let suffix = port.map(|port| format!("-{port}")).unwrap_or_default();
        dir.join(format!("{device_name}{suffix}.log"))
    }

    /// Creates (or truncates) the log file and opens the write handles.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::LogSink`] when the file cannot be created or
    /// opened.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, BootError> {
        let path = path.into();
        let sink_error = |source| BootError::LogSink {
            path: path.clone(),
            source,
        };
        File::create(&path).map_err(sink_error)?;
        let stdout = open_append(&path).map_err(sink_error)?;
        let stderr = open_append(&path).map_err(sink_error)?;
        Ok(Self {
            path,
            stdout: Some(stdout),
            stderr: Some(stderr),
            captured: None,
        })
    }

    /// Log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`LogSink::release`] has already run.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.captured.is_some()
    }

    /// Child stdio handles writing into the log.
    ///
    /// # Errors
    ///
    /// Fails once the sink has been released, or if the handles cannot be
    /// duplicated.
    pub fn stdio(&self) -> io::Result<(Stdio, Stdio)> {
        match (&self.stdout, &self.stderr) {
            (Some(stdout), Some(stderr)) => {
                Ok((Stdio::from(stdout.try_clone()?), Stdio::from(stderr.try_clone()?)))
            }
            _ => Err(io::Error::other("boot log already released")),
        }
    }

    /// Current contents of the log.
    #[must_use]
    pub fn read(&self) -> String {
        match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    /// Captures the contents, closes the handles, and removes the file.
    pub fn release(&mut self) -> &str {
        if self.captured.is_none() {
            let contents = self.read();
            drop(self.stdout.take());
            drop(self.stderr.take());
            if let Err(error) = fs::remove_file(&self.path) {
                debug!(
                    target: BOOT_TARGET,
                    path = %self.path.display(),
                    %error,
                    "boot log cleanup skipped"
                );
            }
            self.captured = Some(contents);
        }
        self.captured.as_deref().unwrap_or_default()
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        self.release();
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).open(path)
}
