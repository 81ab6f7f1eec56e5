//! Duplicate groups and scan summary produced at report time.
//!
//! # Example
//!
//! ```
//! use dupehound::duplicates::DuplicateGroup;
//! use dupehound::scanner::PathEntry;
//! use std::path::PathBuf;
//!
//! let group = DuplicateGroup::new(
//!     "ab".repeat(32),
//!     1024,
//!     vec![
//!         PathEntry::new(PathBuf::from("/file1.txt")).unwrap(),
//!         PathEntry::new(PathBuf::from("/file2.txt")).unwrap(),
//!     ],
//! );
//!
//! assert_eq!(group.duplicate_count(), 1);
//! assert_eq!(group.wasted_space(), 1024);
//! ```

use std::time::Duration;

use bytesize::ByteSize;
use serde::Serialize;

use crate::scanner::PathEntry;

/// Paths that share one content digest (two or more of them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// BLAKE3 digest as 64 lowercase hex characters
    pub digest: String,
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Member paths in the order their workers finished hashing
    pub paths: Vec<PathEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `digest` - Hex content digest
    /// * `size` - File size in bytes
    /// * `paths` - Member paths
    #[must_use]
    pub fn new(digest: String, size: u64, paths: Vec<PathEntry>) -> Self {
        Self {
            digest,
            size,
            paths,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Regular files found by the walker
    pub total_files: u64,
    /// Directories found by the walker (root excluded)
    pub total_dirs: u64,
    /// Non-regular entries the walker skipped
    pub skipped_entries: u64,
    /// Directories or entries the walker could not read
    pub walk_errors: u64,
    /// Files hashed successfully
    pub hashed_files: u64,
    /// Files that could not be hashed and were left out
    pub failed_files: u64,
    /// Zero-byte files among the hashed files
    pub empty_files: u64,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Total space that could be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Wall-clock time of the scan
    #[serde(serialize_with = "serialize_millis", rename = "scan_duration_ms")]
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Fill the group-derived totals from the final report.
    pub fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format hashed bytes as human-readable string.
    #[must_use]
    pub fn bytes_hashed_display(&self) -> String {
        ByteSize(self.bytes_hashed).to_string()
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
