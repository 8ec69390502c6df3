use std::path::Path;

use crate::logging::LogFormat;

/// Default poll interval, in milliseconds, for log tailing and child monitoring.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

/// Default number of additional attempts made by the command runner.
pub const DEFAULT_EXEC_RETRIES: u32 = 9;

/// Default delay, in milliseconds, between command runner attempts.
pub const DEFAULT_EXEC_RETRY_INTERVAL_MS: u64 = 1000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Boot logs land in the working directory unless configured otherwise.
#[must_use]
pub fn default_log_dir() -> &'static Path {
    Path::new(".")
}
