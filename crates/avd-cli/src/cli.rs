//! Command-line grammar for the `avd` binary.

use std::num::NonZeroU16;

use clap::{Parser, Subcommand};

/// Parsed command following the configuration prefix.
#[derive(Debug, Parser)]
#[command(
    name = "avd",
    version,
    about = "Boot Android virtual devices and wait for them to serve ADB",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Lists the virtual devices known to the emulator.
    List,
    /// Boots a virtual device and waits until it is ready.
    Boot {
        /// Name of the virtual device to boot.
        device: String,
        /// Console port for the emulator instance.
        #[arg(long)]
        port: Option<NonZeroU16>,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn boot_parses_device_and_port() {
        let cli = Cli::try_parse_from(["avd", "boot", "Pixel_4_API_30", "--port", "5554"])
            .expect("parse boot");
        assert_eq!(
            cli.command,
            CliCommand::Boot {
                device: String::from("Pixel_4_API_30"),
                port: NonZeroU16::new(5554),
            }
        );
    }

    #[rstest]
    #[case(&["avd"])]
    #[case(&["avd", "boot"])]
    #[case(&["avd", "boot", "Pixel", "--port", "0"])]
    #[case(&["avd", "wipe"])]
    fn malformed_commands_are_rejected(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
