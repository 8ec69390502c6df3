//! CLI entrypoint for the emulator boot tool.
//!
//! The binary delegates to [`avd_cli::run`], which loads configuration,
//! installs telemetry, and dispatches the `list` and `boot` commands.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handles: the log watcher thread writes telemetry to stderr
    // while the main thread is blocked in `boot`.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    avd_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
