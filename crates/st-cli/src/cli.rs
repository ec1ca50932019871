//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Screen time from the macOS Knowledge store.
///
/// Summarizes which applications were in the foreground, writes the summary
/// into a Markdown daily note, and browses days on an interactive timeline.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the raw usage intervals of a day.
    Query {
        #[command(flatten)]
        day: DayArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the hourly summary of a day.
    Summary {
        #[command(flatten)]
        day: DayArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the summary into the day's note under "## Screen Time".
    Insert {
        #[command(flatten)]
        day: DayArgs,
    },

    /// Print the display names of bundle identifiers.
    Resolve {
        /// Identifiers such as com.apple.Safari.
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Browse days on an interactive timeline.
    Timeline {
        /// Day to open (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

/// Selects the day a command works on.
#[derive(Debug, Clone, Default, Args)]
pub struct DayArgs {
    /// Day to use (YYYY-MM-DD). Defaults to today.
    #[arg(long, conflicts_with = "yesterday")]
    pub date: Option<String>,

    /// Use yesterday.
    #[arg(long)]
    pub yesterday: bool,
}
