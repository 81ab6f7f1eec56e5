//! Bounded-length owned paths handed from the walker to the hashing workers.
//!
//! # Overview
//!
//! Every path that travels through the pipeline is wrapped in a
//! [`PathEntry`]. Construction checks the platform's maximum path length so
//! that nothing downstream has to deal with paths the OS would reject anyway.
//!
//! # Example
//!
//! ```
//! use dupehound::scanner::path_utils::PathEntry;
//! use std::path::PathBuf;
//!
//! let entry = PathEntry::new(PathBuf::from("/tmp/a.txt")).unwrap();
//! assert_eq!(entry.as_path(), std::path::Path::new("/tmp/a.txt"));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ScanError;

/// Maximum path length in bytes accepted by [`PathEntry::new`].
///
/// `PATH_MAX` includes the terminating NUL.
#[cfg(unix)]
pub const MAX_PATH_LEN: usize = libc::PATH_MAX as usize - 1;

/// Maximum path length in bytes accepted by [`PathEntry::new`].
#[cfg(not(unix))]
pub const MAX_PATH_LEN: usize = 32_767;

/// An owned file-system path that never exceeds [`MAX_PATH_LEN`] bytes.
///
/// Paths are produced by the walker, which joins a parent directory with
/// an entry name using exactly one separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PathEntry(PathBuf);

impl PathEntry {
    /// Wrap a path, rejecting it if it is longer than [`MAX_PATH_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::PathTooLong`] when the encoded path exceeds the
    /// platform limit.
    pub fn new(path: PathBuf) -> Result<Self, ScanError> {
        let len = path.as_os_str().len();
        if len > MAX_PATH_LEN {
            return Err(ScanError::PathTooLong { path, len });
        }
        Ok(Self(path))
    }

    /// Borrow the underlying path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume the entry, returning the owned path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for PathEntry {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}
