//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Depth-first directory walking that feeds the hashing pipeline
//! - Streaming BLAKE3 content digests with bounded per-chunk reads
//! - Bounded-length path entries
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal, the producer side of the pipeline
//! - [`hasher`]: BLAKE3 file hashing (streaming, poll-bounded reads)
//! - [`path_utils`]: The [`PathEntry`] type passed between threads
//!
//! # Example
//!
//! ```no_run
//! use dupehound::scanner::{Hasher, HasherConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HasherConfig::default());
//! let (digest, bytes) = hasher.digest(Path::new("Cargo.toml")).unwrap();
//! println!("{digest}: {bytes} bytes");
//! ```

pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::path::PathBuf;
use std::time::Duration;

// Re-export main types
pub use hasher::{Digest, Hasher, HasherConfig, DIGEST_LEN};
pub use path_utils::{PathEntry, MAX_PATH_LEN};
pub use walker::{DirectoryWalker, WalkCounters};

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A joined path exceeded the platform path length limit.
    #[error("Path too long ({len} bytes): {path}")]
    PathTooLong {
        /// The offending path
        path: PathBuf,
        /// Its length in bytes
        len: usize,
    },

    /// An I/O error occurred while reading a directory or entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path` into the matching variant.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path does not name a regular file.
    #[error("Not a regular file: {0}")]
    NotRegularFile(PathBuf),

    /// Reads kept timing out; the file was abandoned.
    #[error("Read stalled {stalls} times ({timeout:?} each): {path}")]
    Stalled {
        /// Path of the stalled file
        path: PathBuf,
        /// Consecutive timed-out reads
        stalls: u32,
        /// Per-read timeout
        timeout: Duration,
    },

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for `path` into the matching variant.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
