//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;
pub use crate::render::OutputFormat;

/// Options shared by every command that builds a fleet.
#[derive(Debug, Clone, Args)]
pub struct FleetArgs {
    /// Seed the generator for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of vehicles (overrides configuration)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub vehicles: Option<usize>,

    /// Only list vehicles whose id or zone contains this text
    #[arg(long, default_value = "")]
    pub query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl FleetArgs {
    /// Apply the seed and fleet size overrides to loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(vehicles) = self.vehicles {
            config.simulation.fleet_size = vehicles;
        }
    }
}

/// Live dashboard arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Stop after this many fleet ticks
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Fleet options
    #[command(flatten)]
    pub fleet: FleetArgs,
}

/// One-shot dashboard arguments.
#[derive(Debug, Args)]
pub struct SnapshotCommand {
    /// Ticks to apply before printing
    #[arg(short, long, default_value = "0")]
    pub ticks: u64,

    /// Fleet options
    #[command(flatten)]
    pub fleet: FleetArgs,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
