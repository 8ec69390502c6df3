//! Short-lived commands against the emulator binary.

use std::path::{Path, PathBuf};

use avd_config::Config;

use crate::error::BootError;
use crate::exec::{CommandExecutor, RetryingExecutor};

const LIST_AVDS: &str = "-list-avds --verbose";

/// Handle on the emulator binary for query commands.
#[derive(Debug, Clone)]
pub struct Emulator<E = RetryingExecutor> {
    binary: PathBuf,
    executor: E,
}

impl Emulator<RetryingExecutor> {
    /// Builds a handle using the configured binary and retry policy.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.emulator_binary(), RetryingExecutor::from_config(config))
    }
}

impl<E: CommandExecutor> Emulator<E> {
    /// Builds a handle with an explicit executor.
    pub fn new(binary: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    /// Path of the emulator binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Runs the emulator with a whitespace-separated argument suffix.
    ///
    /// # Errors
    ///
    /// Propagates the executor's failure unchanged.
    pub fn exec(&self, command: &str) -> Result<String, BootError> {
        let args: Vec<String> = command.split_whitespace().map(String::from).collect();
        Ok(self.executor.exec(&self.binary, &args)?)
    }

    /// Lists the virtual devices known to the emulator.
    ///
    /// # Errors
    ///
    /// Propagates the executor's failure unchanged.
    pub fn list_avds(&self) -> Result<Vec<String>, BootError> {
        let output = self.exec(LIST_AVDS)?;
        Ok(parse_avd_list(&output))
    }
}

/// Splits `-list-avds` output into one device name per non-empty line.
#[must_use]
pub fn parse_avd_list(output: &str) -> Vec<String> {
    output
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
