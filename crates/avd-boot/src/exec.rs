//! Short-lived command execution with retries.
//!
//! The emulator's query commands (for example `-list-avds`) occasionally fail
//! while the SDK is still settling on freshly provisioned CI hosts, so the
//! production executor retries non-successful runs before giving up.

use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use avd_config::Config;
use tracing::{debug, warn};

use crate::EXEC_TARGET;
use crate::error::ExecError;

/// Runs a command to completion and returns its standard output.
pub trait CommandExecutor {
    /// Executes `program` with `args`, returning captured stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] when the command cannot run or exits
    /// unsuccessfully.
    fn exec(&self, program: &Path, args: &[String]) -> Result<String, ExecError>;
}

/// Executor that retries failed commands at a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct RetryingExecutor {
    retries: u32,
    interval: Duration,
}

impl RetryingExecutor {
    /// Builds an executor making up to `retries` additional attempts.
    #[must_use]
    pub const fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// Builds an executor from the configured retry policy.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.exec_retries, config.exec_retry_interval())
    }

    fn run_once(program: &Path, args: &[String]) -> Result<String, ExecError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Io {
                command: render_command(program, args),
                source,
            })?;
        if !output.status.success() {
            return Err(ExecError::Failed {
                command: render_command(program, args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CommandExecutor for RetryingExecutor {
    fn exec(&self, program: &Path, args: &[String]) -> Result<String, ExecError> {
        debug!(
            target: EXEC_TARGET,
            command = %render_command(program, args),
            "executing emulator command"
        );
        let mut attempt = 0;
        loop {
            match Self::run_once(program, args) {
                Ok(stdout) => return Ok(stdout),
                Err(error) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        target: EXEC_TARGET,
                        attempt,
                        retries = self.retries,
                        %error,
                        "command failed; retrying"
                    );
                    thread::sleep(self.interval);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

pub(crate) fn render_command(program: &Path, args: &[String]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn shell(script: &str) -> Vec<String> {
        vec![String::from("-c"), String::from(script)]
    }

    #[test]
    fn returns_stdout_on_success() {
        let executor = RetryingExecutor::new(0, Duration::ZERO);
        let stdout = executor
            .exec(Path::new("sh"), &shell("printf 'a\\nb\\n'"))
            .expect("command succeeds");
        assert_eq!(stdout, "a\nb\n");
    }

    #[test]
    fn reports_exit_code_and_stderr_after_exhausting_retries() {
        let executor = RetryingExecutor::new(2, Duration::ZERO);
        let error = executor
            .exec(Path::new("sh"), &shell("echo nope >&2; exit 3"))
            .expect_err("command fails");
        match error {
            ExecError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn retries_until_command_succeeds() {
        let dir = TempDir::new().expect("temp dir");
        let marker = dir.path().join("attempted");
        let script = format!(
            "if [ -f '{path}' ]; then echo ok; else touch '{path}'; exit 1; fi",
            path = marker.display()
        );
        let executor = RetryingExecutor::new(1, Duration::ZERO);
        let stdout = executor
            .exec(Path::new("sh"), &shell(&script))
            .expect("second attempt succeeds");
        assert_eq!(stdout.trim(), "ok");
        assert!(fs::metadata(&marker).is_ok());
    }

    #[test]
    fn missing_binary_is_an_io_error() {
        let executor = RetryingExecutor::new(0, Duration::ZERO);
        let error = executor
            .exec(Path::new("/nonexistent/emulator"), &[])
            .expect_err("binary missing");
        assert!(matches!(error, ExecError::Io { .. }));
    }
}
