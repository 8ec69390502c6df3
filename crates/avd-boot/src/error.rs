//! Error types for boot attempts and emulator commands.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while booting a virtual device or querying the emulator.
#[derive(Debug, Error)]
pub enum BootError {
    /// The boot request named no device.
    #[error("virtual device name must not be empty")]
    EmptyDeviceName,
    /// The per-boot log file could not be created.
    #[error("failed to prepare boot log {path:?}: {source}")]
    LogSink {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Polling the spawned emulator failed.
    #[error("failed to monitor emulator launch: {source}")]
    Monitor {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The emulator failed to start or exited before becoming ready.
    #[error("emulator {binary:?} failed to boot: {cause}")]
    SpawnFailed {
        /// Emulator binary that was launched.
        binary: PathBuf,
        /// Why the launch was rejected.
        #[source]
        cause: SpawnCause,
        /// Log output captured before the boot log was removed.
        output: String,
    },
    /// A short-lived emulator command failed.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl BootError {
    /// Log output captured from a failed boot, if any.
    #[must_use]
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::SpawnFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Reason a spawned emulator was rejected.
#[derive(Debug, Error)]
pub enum SpawnCause {
    /// The operating system refused to start the binary.
    #[error("could not launch process: {0}")]
    Launch(#[source] io::Error),
    /// The process exited unsuccessfully before reporting readiness.
    #[error("{}", describe_exit(.code))]
    Exited {
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(
        || String::from("process terminated by signal"),
        |code| format!("process exited with status {code}"),
    )
}

/// Errors raised by the command executor.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command could not be started or its output collected.
    #[error("failed to run `{command}`: {source}")]
    Io {
        /// Rendered command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The command ran but reported failure.
    #[error("`{command}` exited with status {code:?}: {stderr}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use rstest::rstest;

    use super::*;

    #[test]
    fn spawn_failure_exposes_launch_error_as_source() {
        let error = BootError::SpawnFailed {
            binary: PathBuf::from("/sdk/emulator/emulator"),
            cause: SpawnCause::Launch(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            output: String::new(),
        };

        let cause = error.source().expect("spawn cause");
        assert_eq!(cause.to_string(), "could not launch process: no such file");
        let launch = cause
            .source()
            .and_then(|source| source.downcast_ref::<io::Error>())
            .expect("launch io error");
        assert_eq!(launch.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    #[case(Some(1), "process exited with status 1")]
    #[case(None, "process terminated by signal")]
    fn exit_causes_describe_status(#[case] code: Option<i32>, #[case] expected: &str) {
        let cause = SpawnCause::Exited { code };
        assert_eq!(cause.to_string(), expected);
        assert!(cause.source().is_none());
    }
}
