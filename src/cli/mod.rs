//! CLI interface for cross-scanner
//!
//! Provides subcommands for:
//! - `run`: Start the scan loop with Telegram alerts
//! - `universe`: Print the filtered watch-list and its groups
//! - `check`: Evaluate one instrument's crossover state
//! - `config`: Show the effective configuration

mod check;
mod run;
mod universe;

pub use check::CheckArgs;
pub use run::RunArgs;
pub use universe::UniverseArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cross-scanner")]
#[command(about = "Rotating watch-list scanner for EMA / smoothed-SMA bullish crossovers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the scan loop
    Run(RunArgs),
    /// Fetch and print the filtered watch-list
    Universe(UniverseArgs),
    /// Fetch one instrument's history and report its crossover state
    Check(CheckArgs),
    /// Show configuration
    Config,
}
