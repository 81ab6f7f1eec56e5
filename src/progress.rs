//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to display a spinner on stderr while the walker
//! discovers files and the workers hash them.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for the scan pipeline.
///
/// Methods are called concurrently from the walker thread and every
/// hashing worker, so implementations must be cheap and thread-safe.
pub trait ProgressCallback: Send + Sync {
    /// Called by the walker for every regular file it queues.
    fn on_file_discovered(&self, _path: &Path) {}

    /// Called by a worker after a file was hashed.
    ///
    /// # Arguments
    ///
    /// * `path` - The hashed file
    /// * `bytes` - Number of bytes read
    fn on_file_hashed(&self, path: &Path, bytes: u64);

    /// Called by a worker when a file could not be hashed.
    fn on_file_failed(&self, _path: &Path) {}

    /// Called once after all workers have been joined.
    fn on_scan_end(&self);
}

/// Spinner-based progress reporter.
pub struct Progress {
    bar: ProgressBar,
    discovered: AtomicU64,
    hashed: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupehound::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            bar,
            discovered: AtomicU64::new(0),
            hashed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Files discovered so far.
    #[must_use]
    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    /// Files hashed so far.
    #[must_use]
    pub fn hashed(&self) -> u64 {
        self.hashed.load(Ordering::Relaxed)
    }

    /// Files that failed to hash so far.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "{} found, {} hashed ({}), {} failed",
            self.discovered(),
            self.hashed(),
            ByteSize(self.bytes.load(Ordering::Relaxed)),
            self.failed()
        ));
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
}

impl ProgressCallback for Progress {
    fn on_file_discovered(&self, _path: &Path) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn on_file_hashed(&self, _path: &Path, bytes: u64) {
        self.hashed.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.refresh();
    }

    fn on_file_failed(&self, _path: &Path) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn on_scan_end(&self) {
        self.bar.finish_and_clear();
    }
}
