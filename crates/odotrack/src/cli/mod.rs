//! Command-line interface for odotrack.
//!
//! This module provides the CLI structure for the `odotrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AddCommand, ClearCommand, ConfigCommand, ShowCommand, StatusCommand};

/// odotrack - Keep an odometer log from photos
///
/// Photograph the odometer, add the photo, and odotrack reads the six-digit
/// value and records it. Review the log as a table or a chart, as absolute
/// values or as distance traveled since the first reading.
#[derive(Debug, Parser)]
#[command(name = "odotrack")]
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
    /// Add readings from odometer photos
    Add(AddCommand),

    /// Show recorded readings as a table or chart
    Show(ShowCommand),

    /// Delete all readings
    Clear(ClearCommand),

    /// Show a summary of the log
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
