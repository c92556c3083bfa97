//! CLI interface for pulse-dash
//!
//! Provides subcommands for:
//! - `run`: Live dashboard until Ctrl-C
//! - `price`: One-shot Bitcoin quote
//! - `config`: Show effective configuration

mod price;
mod run;

pub use price::PriceArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pulse-dash")]
#[command(about = "Personal dashboard: live Bitcoin price plus simulated coffee and SMS counters")]
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
    /// Run the live dashboard
    Run(RunArgs),
    /// Fetch the current Bitcoin price once
    Price(PriceArgs),
    /// Show configuration
    Config,
}
