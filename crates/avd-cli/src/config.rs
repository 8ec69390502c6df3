//! Configuration loading helpers for the CLI.
//!
//! Leading configuration flags are routed to `ortho-config` while the
//! remaining tokens form the `list`/`boot` command parsed by clap.

use std::ffi::{OsStr, OsString};

use avd_config::{Config, HEADLESS_SWITCH, READ_ONLY_EMU_SWITCH};

use crate::AppError;

/// Configuration flags that take a value.
const CONFIG_VALUE_FLAGS: &[&str] = &[
    "--config-path",
    "--emulator-path",
    "--gpu",
    "--log-dir",
    "--poll-interval-ms",
    "--exec-retries",
    "--exec-retry-interval-ms",
    "--log-filter",
    "--log-format",
];

/// Configuration flags that are boolean switches.
const CONFIG_SWITCH_FLAGS: &[&str] = &[HEADLESS_SWITCH, READ_ONLY_EMU_SWITCH];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI.
    ///
    /// Configuration flags must appear before the command. Flags after it
    /// are parsed as command arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_layered(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }
    let (flag, inline_value) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(flag, _)| (flag, true));
    if CONFIG_SWITCH_FLAGS.contains(&flag) {
        return FlagAction::Include { needs_value: false };
    }
    if CONFIG_VALUE_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !inline_value,
        };
    }
    FlagAction::Skip
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` into the configuration prefix and the command, each keeping
/// the program name as `argv[0]`.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_start = rest.len();
    let mut consumed = 0usize;
    while let Some(argument) = remaining.next() {
        match classify_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                consumed += 1;
                if needs_value {
                    if let Some(value) = remaining.next() {
                        config_arguments.push(value.clone());
                        consumed += 1;
                    }
                }
            }
            FlagAction::Skip => {
                command_start = consumed;
                break;
            }
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(rest.iter().skip(command_start).cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
