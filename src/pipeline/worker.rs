//! Hashing worker pool, the consumer side of the scan pipeline.
//!
//! Each worker:
//! - Pulls a path from the [`BoundedPathQueue`] (with a timeout)
//! - Streams the file through the [`Hasher`]
//! - Publishes `(digest, path)` into the [`DuplicateIndex`]
//!
//! A worker keeps looping while the walker is still producing or the queue
//! still holds paths. A timed-out dequeue only sends it back to re-check
//! that condition, so workers drain everything and then exit on their own.
//!
//! When the last worker of a pool exits, including by panicking, the queue
//! is closed so a walker blocked on a full queue is released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{BoundedPathQueue, WorkStatus};
use crate::duplicates::{DuplicateIndex, FinderError};
use crate::progress::ProgressCallback;
use crate::scanner::Hasher;

/// Statistics collected by one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Files hashed and inserted into the index
    pub hashed: u64,
    /// Files skipped because hashing failed
    pub failed: u64,
    /// Zero-byte files among `hashed`
    pub empty: u64,
    /// Bytes read
    pub bytes: u64,
}

impl WorkerStats {
    /// Fold another worker's statistics into this one.
    pub fn merge(&mut self, other: &Self) {
        self.hashed += other.hashed;
        self.failed += other.failed;
        self.empty += other.empty;
        self.bytes += other.bytes;
    }
}

/// Everything a worker thread needs, shared across the pool.
#[derive(Clone)]
pub struct WorkerContext {
    /// Source of paths
    pub queue: Arc<BoundedPathQueue>,
    /// Whether the walker may still enqueue
    pub status: WorkStatus,
    /// Destination of digests
    pub index: Arc<DuplicateIndex>,
    /// Shared hasher configuration
    pub hasher: Arc<Hasher>,
    /// How long an idle worker waits before re-checking `status`
    pub dequeue_timeout: Duration,
    /// Optional progress sink
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

/// A running hashing thread.
struct Worker {
    id: usize,
    handle: JoinHandle<WorkerStats>,
}

/// Held by each worker thread for its whole life; the last one dropped
/// closes the queue.
struct LiveWorker {
    id: usize,
    live: Arc<AtomicUsize>,
    queue: Arc<BoundedPathQueue>,
}

impl LiveWorker {
    fn enlist(id: usize, live: &Arc<AtomicUsize>, queue: &Arc<BoundedPathQueue>) -> Self {
        live.fetch_add(1, Ordering::AcqRel);
        Self {
            id,
            live: Arc::clone(live),
            queue: Arc::clone(queue),
        }
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("Hashing worker {} is unwinding", self.id);
        }
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            log::debug!("Last hashing worker gone, closing queue");
            self.queue.close();
        }
    }
}

/// Fixed-size pool of hashing threads.
pub struct HashWorkerPool {
    workers: Vec<Worker>,
}

impl HashWorkerPool {
    /// Spawn `size` workers (at least one) sharing `context`.
    ///
    /// Must be called before anything else can enqueue: if a thread cannot
    /// be created, the status is finished and the workers already started
    /// are joined before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a thread cannot be created.
    pub fn spawn(size: usize, context: &WorkerContext) -> Result<Self, FinderError> {
        let size = size.max(1);
        let mut pool = Self {
            workers: Vec::with_capacity(size),
        };

        let live = Arc::new(AtomicUsize::new(0));

        for id in 0..size {
            let ctx = context.clone();
            let guard = LiveWorker::enlist(id, &live, &context.queue);
            let spawned = thread::Builder::new()
                .name(format!("hasher-{id}"))
                .spawn(move || {
                    let _guard = guard;
                    worker_loop(id, &ctx)
                });
            match spawned {
                Ok(handle) => pool.workers.push(Worker { id, handle }),
                Err(source) => {
                    context.status.finish();
                    if let Err(e) = pool.join() {
                        log::warn!("While unwinding failed spawn: {}", e);
                    }
                    return Err(FinderError::Spawn {
                        name: format!("hasher-{id}"),
                        source,
                    });
                }
            }
        }

        log::debug!("Spawned {} hashing workers", pool.workers.len());
        Ok(pool)
    }

    /// Number of running workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the pool has no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker and return their combined statistics.
    ///
    /// Only returns once each worker has observed "not producing and queue
    /// empty", so the status must be finished first.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPanicked`] if any worker panicked. All
    /// workers are joined regardless.
    pub fn join(self) -> Result<WorkerStats, FinderError> {
        let mut total = WorkerStats::default();
        let mut panicked = None;

        for worker in self.workers {
            match worker.handle.join() {
                Ok(stats) => total.merge(&stats),
                Err(_) => {
                    log::error!("Hashing worker {} panicked", worker.id);
                    panicked.get_or_insert(FinderError::ThreadPanicked {
                        name: format!("hasher-{}", worker.id),
                    });
                }
            }
        }

        match panicked {
            Some(err) => Err(err),
            None => Ok(total),
        }
    }
}

/// Main worker loop.
fn worker_loop(id: usize, ctx: &WorkerContext) -> WorkerStats {
    let mut stats = WorkerStats::default();
    log::trace!("Worker {} started", id);

    while ctx.status.is_producing() || !ctx.queue.is_empty() {
        let Some(path) = ctx.queue.dequeue(ctx.dequeue_timeout) else {
            continue;
        };

        match ctx.hasher.digest(path.as_path()) {
            Ok((digest, bytes)) => {
                log::trace!("Worker {}: {} {}", id, digest, path);
                stats.hashed += 1;
                stats.bytes += bytes;
                if bytes == 0 {
                    stats.empty += 1;
                }
                if let Some(ref callback) = ctx.progress {
                    callback.on_file_hashed(path.as_path(), bytes);
                }
                ctx.index.insert(&digest.to_hex(), path, bytes);
            }
            Err(e) => {
                log::warn!("Failed to hash: {}", e);
                stats.failed += 1;
                if let Some(ref callback) = ctx.progress {
                    callback.on_file_failed(path.as_path());
                }
            }
        }
    }

    log::trace!(
        "Worker {} exiting: {} hashed, {} failed",
        id,
        stats.hashed,
        stats.failed
    );
    stats
}
