//! Concurrent digest → paths index populated by the hashing workers.
//!
//! All mutation goes through one mutex that is held only for the
//! insert-or-append itself, never across hashing.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::DuplicateGroup;
use crate::scanner::PathEntry;

/// Every path that hashed to one digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    /// Content size in bytes, shared by every path in the record
    pub size: u64,
    /// Paths in the order their workers finished hashing them
    pub paths: Vec<PathEntry>,
}

impl DuplicateRecord {
    fn new(size: u64) -> Self {
        Self {
            size,
            paths: Vec::with_capacity(1),
        }
    }

    /// Whether two or more paths share this content.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.paths.len() >= 2
    }
}

/// Mapping from hex digest to the [`DuplicateRecord`] of matching paths.
///
/// Shared between workers behind an `Arc`; read once, after every worker
/// has been joined, through [`report`](Self::report).
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    records: Mutex<HashMap<String, DuplicateRecord>>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` (of `size` bytes) hashed to `digest_hex`.
    ///
    /// Creates the record on first sight of a digest, appends otherwise.
    pub fn insert(&self, digest_hex: &str, path: PathEntry, size: u64) {
        let mut records = self.records.lock();
        match records.get_mut(digest_hex) {
            Some(record) => record.paths.push(path),
            None => {
                let mut record = DuplicateRecord::new(size);
                record.paths.push(path);
                records.insert(digest_hex.to_owned(), record);
            }
        }
    }

    /// Number of distinct digests seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of the record for `digest_hex`, if any.
    #[must_use]
    pub fn get(&self, digest_hex: &str) -> Option<DuplicateRecord> {
        self.records.lock().get(digest_hex).cloned()
    }

    /// Every record with two or more paths, as duplicate groups.
    ///
    /// Groups are ordered by digest; paths keep their insertion order.
    #[must_use]
    pub fn report(&self) -> Vec<DuplicateGroup> {
        let records = self.records.lock();
        let mut groups: Vec<DuplicateGroup> = records
            .iter()
            .filter(|(_, record)| record.is_duplicate())
            .map(|(digest, record)| DuplicateGroup {
                digest: digest.clone(),
                size: record.size,
                paths: record.paths.clone(),
            })
            .collect();
        groups.sort_by(|a, b| a.digest.cmp(&b.digest));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    fn entry(name: &str) -> PathEntry {
        PathEntry::new(PathBuf::from(name)).unwrap()
    }

    #[test]
    fn test_insert_creates_then_appends() {
        let index = DuplicateIndex::new();
        index.insert("aa", entry("/a"), 5);
        assert_eq!(index.len(), 1);
        assert!(!index.get("aa").unwrap().is_duplicate());

        index.insert("aa", entry("/b"), 5);
        let record = index.get("aa").unwrap();
        assert!(record.is_duplicate());
        assert_eq!(record.paths, vec![entry("/a"), entry("/b")]);
        assert_eq!(record.size, 5);
    }

    #[test]
    fn test_report_skips_singletons() {
        let index = DuplicateIndex::new();
        index.insert("aa", entry("/a"), 1);
        index.insert("aa", entry("/b"), 1);
        index.insert("bb", entry("/c"), 1);

        let groups = index.report();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].digest, "aa");
        assert_eq!(groups[0].paths.len(), 2);
    }

    #[test]
    fn test_report_orders_by_digest() {
        let index = DuplicateIndex::new();
        for digest in ["cc", "aa", "bb"] {
            index.insert(digest, entry("/x"), 0);
            index.insert(digest, entry("/y"), 0);
        }
        let digests: Vec<_> = index.report().into_iter().map(|g| g.digest).collect();
        assert_eq!(digests, vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn test_empty_index() {
        let index = DuplicateIndex::new();
        assert!(index.is_empty());
        assert!(index.get("missing").is_none());
        assert!(index.report().is_empty());
    }

    #[test]
    fn test_concurrent_inserts_lose_nothing() {
        let index = Arc::new(DuplicateIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for i in 0..250 {
                        let digest = format!("{:02}", i % 10);
                        index.insert(&digest, entry(&format!("/t{t}/f{i}")), 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 10);
        let groups = index.report();
        let total: usize = groups.iter().map(|g| g.paths.len()).sum();
        assert_eq!(total, 2_000);
        let unique: HashSet<_> = groups.iter().flat_map(|g| g.paths.iter()).collect();
        assert_eq!(unique.len(), 2_000);
    }
}
