//! Logging setup on top of the `log` facade and `env_logger`.
//!
//! Level selection, highest priority first:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. `--quiet` (errors only) or `--verbose` (debug, then trace)
//! 3. Default: info
//!
//! Debug builds prefix each line with a timestamp, and with the module path
//! once `-v` is given; release builds print `LEVEL message` only.
//!
//! ```rust,no_run
//! use dupehound::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("walker started");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logger from the CLI verbosity flags.
///
/// Call once, before any logging. A second call is ignored with a warning
/// rather than panicking, so tests that exercise `run_app` repeatedly in
/// one process stay usable.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    match from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::warn!("Logger already initialized; keeping the existing one");
        return;
    }

    match from_env {
        Some(filter) => log::debug!("Logging initialized from RUST_LOG={:?}", filter),
        None => log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        ),
    }
}

/// Map the CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_millis();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
