//! Structured telemetry initialisation for the CLI.
//!
//! The log watcher emits every emulator line at `trace`. Unless the configured
//! filter names the watcher target itself, that stream is capped at `debug` so
//! a broad `trace` filter does not interleave the whole boot log with the
//! supervisor's own events.

use std::borrow::Cow;
use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use avd_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

const WATCHER_TARGET: &str = "avd_boot::watcher";
const WATCHER_CAP: &str = "avd_boot::watcher=debug";

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// Later calls are no-ops, so tests and embedders may call this repeatedly.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| ())
}

/// Filter expression actually installed for `configured`.
fn filter_expression(configured: &str) -> Cow<'_, str> {
    let trimmed = configured.trim();
    if trimmed.contains(WATCHER_TARGET) {
        Cow::Borrowed(trimmed)
    } else if trimmed.is_empty() {
        Cow::Borrowed(WATCHER_CAP)
    } else {
        Cow::Owned(format!("{trimmed},{WATCHER_CAP}"))
    }
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(filter_expression(config.log_filter()))
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    // The watcher thread logs while `boot` blocks the main thread.
    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("info", "info,avd_boot::watcher=debug")]
    #[case(" trace ", "trace,avd_boot::watcher=debug")]
    #[case("", "avd_boot::watcher=debug")]
    #[case("info,avd_boot::watcher=trace", "info,avd_boot::watcher=trace")]
    fn watcher_output_is_capped_unless_requested(#[case] configured: &str, #[case] expected: &str) {
        assert_eq!(filter_expression(configured), expected);
    }

    #[test]
    fn capped_default_filter_parses() {
        let expression = filter_expression(avd_config::DEFAULT_LOG_FILTER);
        assert!(EnvFilter::try_new(expression).is_ok());
    }

    #[test]
    fn invalid_filter_is_rejected_before_installation() {
        let config = Config {
            log_filter: Some(String::from("avd_boot=notalevel")),
            ..Config::default()
        };
        let error = install_subscriber(&config).expect_err("filter should not parse");
        assert!(matches!(error, TelemetryError::Filter(_)));
    }
}
