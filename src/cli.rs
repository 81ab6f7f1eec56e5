//! Command-line interface definitions.
//!
//! ```bash
//! # Scan a directory and print duplicate groups
//! dupehound ~/Downloads
//!
//! # JSON for scripting
//! dupehound ~/Downloads --output json
//!
//! # Fewer workers, larger queue, debug logging
//! dupehound -v ~/Downloads -w 4 --queue-capacity 4096
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Concurrent duplicate file finder.
///
/// Walks a directory tree, hashes every regular file with BLAKE3 on a pool
/// of worker threads, and reports files whose contents are identical.
#[derive(Debug, Parser)]
#[command(name = "dupehound")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of hashing worker threads [default: 16]
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Capacity of the walker to worker path queue [default: 1024]
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// How long a single read may wait for data, in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub read_timeout_ms: Option<u64>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Configuration values given explicitly on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            read_timeout_ms: self.read_timeout_ms,
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable groups and a summary line
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
