//! Command-line runtime for booting Android virtual devices.
//!
//! The runtime splits leading configuration flags from the command, loads
//! layered configuration, installs telemetry, and dispatches `list` or
//! `boot`. Configuration loading and the emulator backend can be substituted
//! so the dispatch logic is testable without a real SDK.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use avd_boot::{BootError, BootOutcome, BootRequest, BootSupervisor, Emulator};
use avd_config::Config;
use clap::Parser;
use thiserror::Error;
use tracing::debug;

mod cli;
mod config;
mod telemetry;

use cli::{Cli, CliCommand};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub use telemetry::TelemetryError;

const CLI_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::run");

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Emulator operations reachable from the command line.
pub(crate) trait EmulatorBackend {
    fn list_avds(&self) -> Result<Vec<String>, BootError>;

    fn boot(&self, request: &BootRequest) -> Result<BootOutcome, BootError>;
}

/// Backend driving the real emulator binary.
pub(crate) struct SystemBackend {
    emulator: Emulator,
    supervisor: BootSupervisor,
}

impl SystemBackend {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            emulator: Emulator::from_config(config),
            supervisor: BootSupervisor::from_config(config),
        }
    }
}

impl EmulatorBackend for SystemBackend {
    fn list_avds(&self) -> Result<Vec<String>, BootError> {
        self.emulator.list_avds()
    }

    fn boot(&self, request: &BootRequest) -> Result<BootOutcome, BootError> {
        self.supervisor.boot(request)
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run_with_backend<I, B, F>(&mut self, args: I, make_backend: F) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        B: EmulatorBackend,
        F: FnOnce(&Config) -> B,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = Cli::try_parse_from(split.command_arguments.iter().cloned())
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| {
                telemetry::initialise(&config)?;
                let backend = make_backend(&config);
                self.dispatch(cli.command, &config, &backend)
            });

        match result {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                self.report(&error);
                ExitCode::FAILURE
            }
        }
    }

    fn dispatch<B: EmulatorBackend>(
        &mut self,
        command: CliCommand,
        config: &Config,
        backend: &B,
    ) -> Result<ExitCode, AppError> {
        match command {
            CliCommand::List => {
                for name in backend.list_avds()? {
                    writeln!(self.io.stdout, "{name}").map_err(AppError::Output)?;
                }
            }
            CliCommand::Boot { device, port } => {
                let request = BootRequest::from_config(device, config)?.with_port(port);
                debug!(
                    target: CLI_TARGET,
                    device = request.device_name(),
                    platform = %request.platform(),
                    "dispatching boot"
                );
                let outcome = backend.boot(&request)?;
                writeln!(self.io.stdout, "{outcome}").map_err(AppError::Output)?;
            }
        }
        self.io.stdout.flush().map_err(AppError::Output)?;
        Ok(ExitCode::SUCCESS)
    }

    fn report(&mut self, error: &AppError) {
        let _ = writeln!(self.io.stderr, "{error}");
        if let AppError::Boot(boot) = error {
            if let Some(output) = boot.captured_output().filter(|output| !output.is_empty()) {
                let _ = write!(self.io.stderr, "{output}");
                if !output.ends_with('\n') {
                    let _ = writeln!(self.io.stderr);
                }
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with(args, &mut io, &OrthoConfigLoader, SystemBackend::from_config)
}

/// Runs the CLI with a custom configuration loader and backend.
pub(crate) fn run_with<'a, I, W, E, L, B, F>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    make_backend: F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    B: EmulatorBackend,
    F: FnOnce(&Config) -> B,
{
    CliRunner::new(io, loader).run_with_backend(args, make_backend)
}

/// Errors surfaced by the CLI runtime.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading layered configuration failed.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// The command line could not be parsed.
    #[error("{0}")]
    CliUsage(clap::Error),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Booting or querying the emulator failed.
    #[error(transparent)]
    Boot(#[from] BootError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(io::Error),
}
