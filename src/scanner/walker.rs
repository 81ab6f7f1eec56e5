//! Directory walker, the producer side of the scan pipeline.
//!
//! # Overview
//!
//! [`DirectoryWalker`] performs a single-threaded depth-first traversal
//! with [`walkdir`] and pushes every regular file into the shared
//! [`BoundedPathQueue`]. When the queue is full the walker blocks, which is
//! what keeps memory bounded on very large trees.
//!
//! - Directories are counted and descended into (the root itself is not counted)
//! - Regular files are queued and counted
//! - Symlinks, sockets, devices and FIFOs are skipped
//! - An unreadable directory or entry is logged and skipped; its siblings
//!   are still visited
//!
//! When the traversal finishes, or the queue is closed because no hashing
//! worker is left, the walker marks the [`WorkStatus`] as no longer
//! producing.
//!
//! # Example
//!
//! ```no_run
//! use dupehound::pipeline::{BoundedPathQueue, WorkStatus};
//! use dupehound::scanner::DirectoryWalker;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let queue = Arc::new(BoundedPathQueue::new(1024));
//! let walker = DirectoryWalker::new(Arc::clone(&queue), WorkStatus::new());
//! let counters = walker.walk(Path::new("."));
//! println!("{} files, {} directories", counters.files, counters.dirs);
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

use super::{PathEntry, ScanError};
use crate::pipeline::{BoundedPathQueue, WorkStatus};
use crate::progress::ProgressCallback;

/// Tallies accumulated by a single walk.
///
/// Only the walker thread writes these; they are read after it is joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkCounters {
    /// Regular files queued for hashing
    pub files: u64,
    /// Directories descended into, excluding the root
    pub dirs: u64,
    /// Non-regular entries that were skipped
    pub skipped: u64,
    /// Directories or entries that could not be read
    pub errors: u64,
}

/// Depth-first producer feeding the hashing queue.
pub struct DirectoryWalker {
    queue: Arc<BoundedPathQueue>,
    status: WorkStatus,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl DirectoryWalker {
    /// Create a walker that feeds `queue` and finishes `status` when done.
    #[must_use]
    pub fn new(queue: Arc<BoundedPathQueue>, status: WorkStatus) -> Self {
        Self {
            queue,
            status,
            progress: None,
        }
    }

    /// Report each discovered file to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Walk `root`, queueing every regular file below it.
    ///
    /// Never fails as a whole: unreadable parts of the tree are logged,
    /// counted in [`WalkCounters::errors`] and skipped.
    pub fn walk(&self, root: &Path) -> WalkCounters {
        let mut counters = WalkCounters::default();
        log::debug!("Walker: starting at {}", root.display());

        for result in WalkDir::new(root).follow_links(false).min_depth(1) {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    self.record_error(&mut counters, root, e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                counters.dirs += 1;
                log::trace!("Entering directory: {}", entry.path().display());
            } else if file_type.is_file() {
                match PathEntry::new(entry.into_path()) {
                    Ok(path) => {
                        if !self.produce(path, &mut counters) {
                            log::warn!("Walker: queue closed, no hashing workers left; stopping");
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("Skipping entry: {}", e);
                        counters.errors += 1;
                    }
                }
            } else {
                log::trace!("Skipping non-regular entry: {}", entry.path().display());
                counters.skipped += 1;
            }
        }

        if self.status.finish() {
            log::debug!("Walker: traversal complete, no longer producing");
        }

        log::info!(
            "Walk complete: {} files, {} directories, {} skipped, {} errors",
            counters.files,
            counters.dirs,
            counters.skipped,
            counters.errors
        );
        counters
    }

    /// Queue one file. Returns `false` once the queue has been closed.
    fn produce(&self, path: PathEntry, counters: &mut WalkCounters) -> bool {
        if let Some(ref callback) = self.progress {
            callback.on_file_discovered(path.as_path());
        }
        log::trace!("Queueing file: {}", path);
        // Blocks while the queue is full.
        if !self.queue.enqueue(path) {
            return false;
        }
        counters.files += 1;
        true
    }

    fn record_error(&self, counters: &mut WalkCounters, root: &Path, err: walkdir::Error) {
        counters.errors += 1;
        let path = err.path().unwrap_or(root).to_path_buf();
        let err = match err.into_io_error() {
            Some(io) => ScanError::from_io(path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        };
        log::warn!("Cannot read: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn drain(queue: &BoundedPathQueue) -> HashSet<PathBuf> {
        let mut out = HashSet::new();
        while let Some(entry) = queue.dequeue(Duration::from_millis(10)) {
            out.insert(entry.into_path_buf());
        }
        out
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("b.txt"), "hello").unwrap();
        fs::write(dir.path().join("c.txt"), "world").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.txt"), "hello").unwrap();
        dir
    }

    #[test]
    fn test_walk_counts_and_queues_files() {
        let dir = fixture();
        let queue = Arc::new(BoundedPathQueue::new(16));
        let status = WorkStatus::new();
        let walker = DirectoryWalker::new(Arc::clone(&queue), status.clone());

        let counters = walker.walk(dir.path());

        assert_eq!(counters.files, 4);
        assert_eq!(counters.dirs, 1);
        assert_eq!(counters.errors, 0);
        assert!(!status.is_producing());

        let queued = drain(&queue);
        assert_eq!(queued.len(), 4);
        assert!(queued.contains(&dir.path().join("sub").join("d.txt")));
    }

    #[test]
    fn test_walk_empty_directory() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(BoundedPathQueue::new(4));
        let walker = DirectoryWalker::new(Arc::clone(&queue), WorkStatus::new());

        let counters = walker.walk(dir.path());

        assert_eq!(counters, WalkCounters::default());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_walk_missing_root_is_logged_not_fatal() {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(BoundedPathQueue::new(4));
        let status = WorkStatus::new();
        let walker = DirectoryWalker::new(Arc::clone(&queue), status.clone());

        let counters = walker.walk(&dir.path().join("missing"));

        assert_eq!(counters.files, 0);
        assert_eq!(counters.errors, 1);
        assert!(!status.is_producing());
    }

    #[test]
    fn test_walk_blocks_on_full_queue_until_drained() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{i}")), format!("{i}")).unwrap();
        }
        let queue = Arc::new(BoundedPathQueue::new(2));
        let status = WorkStatus::new();
        let walker = DirectoryWalker::new(Arc::clone(&queue), status.clone());

        let root = dir.path().to_path_buf();
        let handle = std::thread::spawn(move || walker.walk(&root));

        let mut seen = 0;
        while status.is_producing() || !queue.is_empty() {
            assert!(queue.len() <= 2);
            if queue.dequeue(Duration::from_millis(50)).is_some() {
                seen += 1;
            }
        }

        let counters = handle.join().unwrap();
        assert_eq!(counters.files, 20);
        assert_eq!(seen, 20);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_stops_when_queue_closed() {
        let dir = fixture();
        let queue = Arc::new(BoundedPathQueue::new(1));
        let status = WorkStatus::new();
        let walker = DirectoryWalker::new(Arc::clone(&queue), status.clone());

        let handle = std::thread::spawn(move || walker.walk(dir.path()));
        std::thread::sleep(Duration::from_millis(50));
        // Walker is parked on the full queue; nobody will ever drain it.
        queue.close();

        let counters = handle.join().unwrap();
        assert_eq!(counters.files, 1);
        assert!(!status.is_producing());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_walk_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let queue = Arc::new(BoundedPathQueue::new(8));
        let walker = DirectoryWalker::new(Arc::clone(&queue), WorkStatus::new());
        let counters = walker.walk(dir.path());

        assert_eq!(counters.files, 1);
        assert_eq!(counters.skipped, 2);
        assert_eq!(counters.dirs, 0);
    }
}
