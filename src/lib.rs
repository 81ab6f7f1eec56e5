//! dupehound - concurrent duplicate file finder.
//!
//! One walker thread feeds regular-file paths through a bounded queue to a
//! pool of hashing workers; files whose BLAKE3 digests collide are reported
//! as duplicate groups.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use cli::{Cli, OutputFormat};
use config::Config;
use duplicates::DuplicateFinder;
use error::ExitCode;
use output::{JsonOutput, TextOutput};
use progress::Progress;

/// Run a scan as described by the parsed command line and print the report
/// on stdout.
///
/// # Errors
///
/// Fails if the configuration is invalid, the root is unusable, the
/// pipeline cannot run to completion, or stdout cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    let mut finder_config = config.finder_config();
    if !cli.no_progress && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .find_duplicates(&cli.path)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, ExitCode::Success)
            .write_to(&mut out, true)
            .context("Failed to write report")?,
    }
    out.flush().context("Failed to write report")?;

    Ok(ExitCode::Success)
}
