//! Command-line interface definitions

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stategen",
    about = "Compile flow diagrams into state-machine modules",
    version
)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile diagrams into machine modules and companion artifacts
    Generate(commands::generate::GenerateArgs),

    /// Check diagram syntax without generating anything
    Lint(commands::lint::LintArgs),

    /// Report which sources changed since the last build
    Status(commands::status::StatusArgs),
}
