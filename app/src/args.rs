//! Command line arguments.
//!
//! Uses clap for parsing, help text (`--help`) and validation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;

/// Log level selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            CliLogLevel::Off => "off",
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        }
    }
}

/// Almanac command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "almanac",
    about = "Plan tasks and a calendar with full undo and redo",
    long_about = "Reads planner commands from SCRIPT, or from stdin when no script is given, \
        one command per line. Lines starting with '#' are comments.\n\n\
        EXAMPLES:\n\
          # Interactive session\n\
          almanac\n\
        \n\
          # Replay a script with a fixed date and verbose logging\n\
          almanac --today 2024-03-01 --log-level debug plan.txt",
    version
)]
pub struct AlmanacArgs {
    /// Configuration file.
    #[arg(long, default_value = "almanac.toml")]
    config: PathBuf,

    /// Overrides `[logging] level` from the configuration.
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Overrides `[edit_log] max_undo` from the configuration.
    #[arg(long)]
    max_undo: Option<usize>,

    /// Date used for status history (defaults to the local date).
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Script to run instead of reading stdin.
    script: Option<PathBuf>,
}

impl AlmanacArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn log_level(&self) -> Option<CliLogLevel> {
        self.log_level
    }

    pub fn max_undo(&self) -> Option<usize> {
        self.max_undo
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }
}
