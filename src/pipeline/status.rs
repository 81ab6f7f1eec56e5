//! Shared "still producing" flag observed by the hashing workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether the walker may still add paths to the queue.
///
/// Starts out producing and transitions to finished exactly once; it is
/// never reset. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct WorkStatus {
    producing: Arc<AtomicBool>,
}

impl WorkStatus {
    /// Create a status in the producing state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            producing: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether more paths may still be enqueued.
    #[must_use]
    pub fn is_producing(&self) -> bool {
        self.producing.load(Ordering::SeqCst)
    }

    /// Mark production as finished.
    ///
    /// Returns `true` only for the call that performed the transition.
    /// Every enqueue made before this call is visible to a worker that
    /// observes the finished state.
    pub fn finish(&self) -> bool {
        self.producing.swap(false, Ordering::SeqCst)
    }
}

impl Default for WorkStatus {
    fn default() -> Self {
        Self::new()
    }
}
