//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::view::ViewMode;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Photos of the odometer, added one after another
    #[arg(required = true, value_name = "IMAGE")]
    pub images: Vec<PathBuf>,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Show a chart instead of the configured default view
    #[arg(long, conflicts_with = "table")]
    pub chart: bool,

    /// Show a table instead of the configured default view
    #[arg(long)]
    pub table: bool,

    /// Show distance traveled since the first reading
    #[arg(short, long, conflicts_with = "absolute")]
    pub zero: bool,

    /// Show absolute odometer values even if zero mode is the default
    #[arg(short, long)]
    pub absolute: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ShowCommand {
    /// The view requested on the command line, if any.
    #[must_use]
    pub fn view_mode(&self) -> Option<ViewMode> {
        if self.chart {
            Some(ViewMode::Chart)
        } else if self.table {
            Some(ViewMode::Table)
        } else {
            None
        }
    }

    /// The zero mode requested on the command line, if any.
    #[must_use]
    pub fn zero_mode(&self) -> Option<bool> {
        if self.zero {
            Some(true)
        } else if self.absolute {
            Some(false)
        } else {
            None
        }
    }
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
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

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
