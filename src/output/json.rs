//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "ea8f163d...",
//!       "size": 5,
//!       "files": ["/data/a.txt", "/data/b.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 4,
//!     "total_dirs": 1,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 10,
//!     "exit_code": 0,
//!     "exit_code_name": "DH000"
//!   }
//! }
//! ```
//!
//! The summary carries every [`ScanSummary`] counter; the schema above is
//! abridged.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Member paths as found by the walker
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.digest.clone(),
            size: group.size,
            files: group
                .paths
                .iter()
                .map(|p| p.as_path().to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Scan counters
    #[serde(flatten)]
    pub scan: ScanSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DH000")
    pub exit_code_name: String,
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups, ordered by hash
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for a finished scan.
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary {
                scan: summary.clone(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the document followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`JsonOutputError`] if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization failed
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while writing output
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PathEntry;
    use std::path::PathBuf;
    use std::time::Duration;

    fn create_test_summary() -> ScanSummary {
        let mut summary = ScanSummary {
            total_files: 100,
            total_dirs: 7,
            hashed_files: 100,
            bytes_hashed: 1024 * 1024,
            scan_duration: Duration::from_millis(1234),
            ..Default::default()
        };
        summary.record_groups(&create_test_groups());
        summary
    }

    fn create_test_groups() -> Vec<DuplicateGroup> {
        let entry = |p: &str| PathEntry::new(PathBuf::from(p)).unwrap();
        vec![
            DuplicateGroup::new(
                "00".repeat(32),
                1024,
                vec![entry("/path/to/file1.txt"), entry("/path/to/file2.txt")],
            ),
            DuplicateGroup::new(
                "ab".repeat(32),
                2048,
                vec![
                    entry("/path/to/fileA.txt"),
                    entry("/path/to/fileB.txt"),
                    entry("/path/to/fileC.txt"),
                ],
            ),
        ]
    }

    #[test]
    fn test_json_output_empty() {
        let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::Success);
        assert!(output.duplicates.is_empty());
        assert_eq!(output.summary.scan.total_files, 0);
        assert_eq!(output.summary.exit_code_name, "DH000");
    }

    #[test]
    fn test_json_is_valid() {
        let groups = create_test_groups();
        let output = JsonOutput::new(&groups, &create_test_summary(), ExitCode::Success);
        let json = output.to_json().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let duplicates = parsed["duplicates"].as_array().unwrap();
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[1]["hash"], "ab".repeat(32));
        assert_eq!(duplicates[1]["size"], 2048);
        assert_eq!(duplicates[1]["files"][2], "/path/to/fileC.txt");

        let summary = &parsed["summary"];
        assert_eq!(summary["total_files"], 100);
        assert_eq!(summary["total_dirs"], 7);
        assert_eq!(summary["duplicate_groups"], 2);
        assert_eq!(summary["reclaimable_space"], 1024 + 2 * 2048);
        assert_eq!(summary["scan_duration_ms"], 1234);
        assert_eq!(summary["exit_code"], 0);
    }

    #[test]
    fn test_to_json_compact_and_pretty() {
        let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::Success);
        let compact = output.to_json().unwrap();
        assert!(!compact.contains('\n'));
        let pretty = output.to_json_pretty().unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_write_to_appends_newline() {
        let output = JsonOutput::new(&create_test_groups(), &create_test_summary(), ExitCode::Success);
        let mut buf = Vec::new();
        output.write_to(&mut buf, false).unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
    }
}
