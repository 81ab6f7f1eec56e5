//! Duplicate finder: the coordinator of the concurrent scan pipeline.
//!
//! # Overview
//!
//! A scan runs one walker thread feeding a bounded queue and a fixed pool
//! of hashing workers draining it:
//!
//! ```text
//! DirectoryWalker ──▶ BoundedPathQueue ──▶ HashWorkerPool ──▶ DuplicateIndex ──▶ report
//! ```
//!
//! The coordinator moves through [`PipelineState`]s:
//! 1. **Idle** - queue and index are created
//! 2. **WalkingAndHashing** - workers and walker run concurrently
//! 3. **Draining** - the walker has been joined and the work status is
//!    finished; workers exit once the queue is empty
//! 4. **Done** - workers are joined and the index is reported
//!
//! # Example
//!
//! ```no_run
//! use dupehound::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_workers(8);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{DuplicateGroup, DuplicateIndex, ScanSummary};
use crate::pipeline::{BoundedPathQueue, HashWorkerPool, WorkStatus, WorkerContext};
use crate::progress::ProgressCallback;
use crate::scanner::{DirectoryWalker, Hasher, HasherConfig};

/// Default number of hashing workers.
pub const DEFAULT_WORKERS: usize = 16;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default idle wait before a worker re-checks the work status.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing worker threads.
    pub workers: usize,
    /// Capacity of the walker → worker queue.
    pub queue_capacity: usize,
    /// How long an idle worker waits for a path before re-checking status.
    pub dequeue_timeout: Duration,
    /// Chunking and read-timeout settings for hashing.
    pub hasher: HasherConfig,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("dequeue_timeout", &self.dequeue_timeout)
            .field("hasher", &self.hasher)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dequeue_timeout: DEFAULT_DEQUEUE_TIMEOUT,
            hasher: HasherConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers (at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the queue capacity (at least one).
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the idle dequeue timeout.
    #[must_use]
    pub fn with_dequeue_timeout(mut self, timeout: Duration) -> Self {
        self.dequeue_timeout = timeout;
        self
    }

    /// Set the hasher configuration.
    #[must_use]
    pub fn with_hasher_config(mut self, hasher: HasherConfig) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Errors that abort a whole scan.
///
/// Per-file and per-directory failures are not errors at this level; they
/// are logged and counted in the [`ScanSummary`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A pipeline thread could not be started.
    #[error("Failed to spawn thread {name}: {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked.
    #[error("Thread {name} panicked")]
    ThreadPanicked {
        /// Thread name
        name: String,
    },
}

/// Lifecycle of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Queue and index exist; no threads yet.
    Idle,
    /// Walker and workers are running.
    WalkingAndHashing,
    /// Walker joined, status finished; workers are emptying the queue.
    Draining,
    /// Workers joined and the report produced.
    Done,
}

impl PipelineState {
    /// The state that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::WalkingAndHashing),
            Self::WalkingAndHashing => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// One scan's worth of shared state. Consumed by [`Pipeline::run`].
struct Pipeline {
    state: PipelineState,
    config: FinderConfig,
    queue: Arc<BoundedPathQueue>,
    index: Arc<DuplicateIndex>,
    status: WorkStatus,
}

impl Pipeline {
    fn new(config: FinderConfig) -> Self {
        Self {
            state: PipelineState::Idle,
            queue: Arc::new(BoundedPathQueue::new(config.queue_capacity)),
            index: Arc::new(DuplicateIndex::new()),
            status: WorkStatus::new(),
            config,
        }
    }

    fn advance(&mut self) {
        match self.state.next() {
            Some(next) => {
                log::debug!("Pipeline: {:?} -> {:?}", self.state, next);
                self.state = next;
            }
            None => debug_assert!(false, "pipeline advanced past Done"),
        }
    }

    fn run(mut self, root: &Path) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start = Instant::now();
        let progress = self.config.progress_callback.clone();

        let context = WorkerContext {
            queue: Arc::clone(&self.queue),
            status: self.status.clone(),
            index: Arc::clone(&self.index),
            hasher: Arc::new(Hasher::new(self.config.hasher.clone())),
            dequeue_timeout: self.config.dequeue_timeout,
            progress: progress.clone(),
        };
        let pool = HashWorkerPool::spawn(self.config.workers, &context)?;

        let mut walker = DirectoryWalker::new(Arc::clone(&self.queue), self.status.clone());
        if let Some(ref callback) = progress {
            walker = walker.with_progress_callback(Arc::clone(callback));
        }
        let walk_root = root.to_path_buf();
        let walker_handle = match thread::Builder::new()
            .name("walker".to_string())
            .spawn(move || walker.walk(&walk_root))
        {
            Ok(handle) => handle,
            Err(source) => {
                self.status.finish();
                if let Err(e) = pool.join() {
                    log::warn!("While unwinding failed spawn: {}", e);
                }
                return Err(FinderError::Spawn {
                    name: "walker".to_string(),
                    source,
                });
            }
        };
        self.advance();

        let walked = walker_handle.join();
        // Workers stop waiting for new paths from here on.
        self.status.finish();
        self.advance();

        let hashed = pool.join();
        if let Some(ref callback) = progress {
            callback.on_scan_end();
        }
        let counters = walked.map_err(|_| FinderError::ThreadPanicked {
            name: "walker".to_string(),
        })?;
        let stats = hashed?;
        debug_assert!(self.queue.is_empty());

        let groups = self.index.report();
        let mut summary = ScanSummary {
            total_files: counters.files,
            total_dirs: counters.dirs,
            skipped_entries: counters.skipped,
            walk_errors: counters.errors,
            hashed_files: stats.hashed,
            failed_files: stats.failed,
            empty_files: stats.empty,
            bytes_hashed: stats.bytes,
            ..Default::default()
        };
        summary.record_groups(&groups);
        summary.scan_duration = start.elapsed();
        self.advance();

        Ok((groups, summary))
    }
}

/// Runs complete scans; each call to
/// [`find_duplicates`](Self::find_duplicates) builds a fresh pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files below `path`.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `Vec<DuplicateGroup>` - Groups of two or more identical files
    /// - `ScanSummary` - Statistics about the scan
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - A pipeline thread cannot be spawned or panics
    ///
    /// Unreadable subdirectories and files are not errors; they are logged,
    /// counted and skipped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupehound::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((groups, summary)) => {
    ///         println!("Found {} duplicate groups", groups.len());
    ///         println!("Scanned {} files", summary.total_files);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!(
            "Starting duplicate scan of {} with {} workers",
            path.display(),
            self.config.workers
        );

        let (groups, summary) = Pipeline::new(self.config.clone()).run(path)?;

        log::info!(
            "Scan complete: {} files, {} duplicate groups in {:.2?}",
            summary.total_files,
            summary.duplicate_groups,
            summary.scan_duration
        );
        Ok((groups, summary))
    }
}
