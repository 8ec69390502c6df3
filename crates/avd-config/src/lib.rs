//! Shared configuration for the emulator boot tooling.
//!
//! Settings are layered by [`ortho_config`]: built-in defaults, an optional
//! TOML file passed with `--config-path`, `AVD_*` environment variables, and
//! finally command-line flags. Optional fields are resolved through accessor
//! methods so callers never need to know the defaults.
//!
//! The `--headless` and `--read-only-emu` switches are applied by
//! [`Config::load_layered`] after the other layers have merged, so an absent
//! switch never masks a value from the file or environment.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod binary;
mod defaults;
mod logging;

pub use binary::{resolve_emulator_binary, resolve_emulator_binary_from};
pub use defaults::{
    DEFAULT_EXEC_RETRIES, DEFAULT_EXEC_RETRY_INTERVAL_MS, DEFAULT_LOG_FILTER,
    DEFAULT_POLL_INTERVAL_MS, default_log_dir, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Command-line switch enabling [`Config::headless`].
pub const HEADLESS_SWITCH: &str = "--headless";

/// Command-line switch enabling [`Config::read_only_emu`].
pub const READ_ONLY_EMU_SWITCH: &str = "--read-only-emu";

/// Emulator tooling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "AVD")]
pub struct Config {
    /// Explicit path to the emulator binary.
    pub emulator_path: Option<PathBuf>,
    /// Boots without a window and enables headless GPU defaults.
    #[ortho_config(default = false, skip_cli)]
    pub headless: bool,
    /// Boots the virtual device in read-only mode.
    #[ortho_config(default = false, skip_cli)]
    pub read_only_emu: bool,
    /// GPU backend override passed verbatim to `-gpu`.
    pub gpu: Option<String>,
    /// Directory holding per-boot log files.
    pub log_dir: Option<PathBuf>,
    /// Poll interval for log tailing and process monitoring.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Additional attempts made by the command runner.
    #[ortho_config(default = DEFAULT_EXEC_RETRIES)]
    pub exec_retries: u32,
    /// Delay between command runner attempts.
    #[ortho_config(default = DEFAULT_EXEC_RETRY_INTERVAL_MS)]
    pub exec_retry_interval_ms: u64,
    /// Tracing filter expression.
    pub log_filter: Option<String>,
    /// Tracing output format.
    pub log_format: Option<LogFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emulator_path: None,
            headless: false,
            read_only_emu: false,
            gpu: None,
            log_dir: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            exec_retries: DEFAULT_EXEC_RETRIES,
            exec_retry_interval_ms: DEFAULT_EXEC_RETRY_INTERVAL_MS,
            log_filter: None,
            log_format: None,
        }
    }
}

impl Config {
    /// Loads every layer from `args` (program name first), then applies the
    /// boolean switches.
    ///
    /// A switch can only turn its setting on; when absent, the merged file and
    /// environment value stands.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer cannot be read or merged.
    pub fn load_layered<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        let mut headless = false;
        let mut read_only_emu = false;
        let layered: Vec<OsString> = args
            .into_iter()
            .map(Into::into)
            .filter(|argument| {
                if argument == HEADLESS_SWITCH {
                    headless = true;
                    false
                } else if argument == READ_ONLY_EMU_SWITCH {
                    read_only_emu = true;
                    false
                } else {
                    true
                }
            })
            .collect();
        let mut config = Self::load_from_iter(layered)?;
        config.headless |= headless;
        config.read_only_emu |= read_only_emu;
        Ok(config)
    }

    /// GPU override, ignoring empty strings.
    #[must_use]
    pub fn gpu_override(&self) -> Option<&str> {
        self.gpu.as_deref().filter(|gpu| !gpu.is_empty())
    }

    /// Directory where boot log files are created.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        self.log_dir.as_deref().unwrap_or_else(|| default_log_dir())
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Delay between command runner attempts.
    #[must_use]
    pub const fn exec_retry_interval(&self) -> Duration {
        Duration::from_millis(self.exec_retry_interval_ms)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or_else(|| default_log_filter())
    }

    /// Tracing output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Resolves the emulator binary from the override or the Android SDK.
    #[must_use]
    pub fn emulator_binary(&self) -> PathBuf {
        resolve_emulator_binary(self.emulator_path.as_deref())
    }
}
