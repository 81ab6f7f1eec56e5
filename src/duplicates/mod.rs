//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The concurrent digest index filled by the hashing workers
//! - Duplicate groups and scan summaries
//! - The pipeline coordinator that runs a whole scan

pub mod finder;
pub mod groups;
pub mod index;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, PipelineState};
pub use groups::{DuplicateGroup, ScanSummary};
pub use index::{DuplicateIndex, DuplicateRecord};
