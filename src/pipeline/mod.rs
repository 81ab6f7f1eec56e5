//! Concurrency plumbing between the walker and the hashing workers.
//!
//! - [`queue`]: Bounded ring buffer of paths with blocking backpressure
//! - [`status`]: The one-way "still producing" flag
//! - [`worker`]: The fixed-size pool of hashing threads
//!
//! The [`DuplicateFinder`](crate::duplicates::DuplicateFinder) wires these
//! together with the [`DirectoryWalker`](crate::scanner::DirectoryWalker).

pub mod queue;
pub mod status;
pub mod worker;

pub use queue::BoundedPathQueue;
pub use status::WorkStatus;
pub use worker::{HashWorkerPool, WorkerContext, WorkerStats};
