//! Command-line argument parsing.
//!
//! The command line only carries runtime options. All connection
//! details and the API key are entered interactively in the sidebar,
//! never via flags, config files, or environment variables.

use std::path::PathBuf;

use clap::Parser;

/// Chat with your database in plain language.
#[derive(Parser, Debug)]
#[command(name = "sqlchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the bundled SQLite database (defaults to student.db next
    /// to the executable)
    #[arg(long, value_name = "PATH")]
    pub local_db: Option<PathBuf>,

    /// Log level filter for the log file (e.g. info, debug, sqlchat=trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
