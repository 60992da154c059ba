//! Command-line interface for fleetwatch.
//!
//! This module provides the CLI structure for the `fleetwatch` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, FleetArgs, OutputFormat, RunCommand, SnapshotCommand};

/// fleetwatch - Watch a simulated vehicle fleet
///
/// Generates a synthetic fleet, advances it on a timer, and prints the
/// dashboard: fleet totals, congestion, maintenance alerts and a filterable
/// fleet table.
#[derive(Debug, Parser)]
#[command(name = "fleetwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the live dashboard until interrupted
    Run(RunCommand),

    /// Advance the fleet offline and print a single dashboard
    Snapshot(SnapshotCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn with_flags(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "fleetwatch");
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(with_flags(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(with_flags(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(with_flags(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(with_flags(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(with_flags(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["fleetwatch", "run"]).unwrap();
        let Command::Run(run) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(run.ticks, None);
        assert_eq!(run.fleet.seed, None);
        assert_eq!(run.fleet.vehicles, None);
        assert_eq!(run.fleet.query, "");
        assert_eq!(run.fleet.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_run_options() {
        let cli = Cli::try_parse_from([
            "fleetwatch",
            "run",
            "--ticks",
            "5",
            "--seed",
            "42",
            "-n",
            "25",
            "--query",
            "ring road",
            "--format",
            "json",
        ])
        .unwrap();
        let Command::Run(run) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(run.ticks, Some(5));
        assert_eq!(run.fleet.seed, Some(42));
        assert_eq!(run.fleet.vehicles, Some(25));
        assert_eq!(run.fleet.query, "ring road");
        assert_eq!(run.fleet.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_snapshot() {
        let cli = Cli::try_parse_from(["fleetwatch", "snapshot", "--ticks", "12"]).unwrap();
        let Command::Snapshot(snapshot) = cli.command else {
            panic!("expected snapshot command");
        };
        assert_eq!(snapshot.ticks, 12);

        let cli = Cli::try_parse_from(["fleetwatch", "snapshot"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Snapshot(SnapshotCommand { ticks: 0, .. })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["fleetwatch", "config", "validate", "-f", "/tmp/fw.toml"])
                .unwrap();
        let Command::Config(ConfigCommand::Validate { file }) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(file, Some(PathBuf::from("/tmp/fw.toml")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["fleetwatch", "-c", "/custom/config.toml", "snapshot"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fleetwatch", "run", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["fleetwatch", "snapshot", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["fleetwatch", "run", "--format", "xml"]).is_err());
    }
}
