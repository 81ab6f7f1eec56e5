//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents. Files are read in fixed-size chunks; before each read
//! the worker waits for readiness with a short timeout, so a single slow or
//! non-blocking-mode file can never pin a hashing thread indefinitely.
//!
//! # Example
//!
//! ```no_run
//! use dupehound::scanner::{Hasher, HasherConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HasherConfig::default());
//! let (digest, bytes) = hasher.digest(Path::new("some_file.bin")).unwrap();
//! println!("{} ({} bytes)", digest.to_hex(), bytes);
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::HashError;

/// Width of a content digest in bytes.
pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Default read chunk size (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Default per-read readiness timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Default number of consecutive timed-out reads before a file is abandoned.
pub const DEFAULT_MAX_READ_STALLS: u32 = 5;

/// A 32-byte BLAKE3 content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Digest of an in-memory buffer.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self::from(blake3::hash(data))
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal rendering (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Tuning for [`Hasher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    /// Size of each read in bytes.
    pub chunk_size: usize,
    /// How long to wait for a file to become readable before each read.
    pub read_timeout: Duration,
    /// Consecutive timed-out waits tolerated before giving up on a file.
    pub max_read_stalls: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_read_stalls: DEFAULT_MAX_READ_STALLS,
        }
    }
}

/// Streaming BLAKE3 file hasher.
///
/// `Hasher` holds only configuration and is shared between workers
/// behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    config: HasherConfig,
}

impl Hasher {
    /// Create a hasher with the given configuration.
    ///
    /// A zero chunk size or stall budget is raised to one.
    #[must_use]
    pub fn new(mut config: HasherConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        config.max_read_stalls = config.max_read_stalls.max(1);
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Compute the content digest of the file at `path`.
    ///
    /// Returns the digest together with the number of bytes hashed.
    ///
    /// # Errors
    ///
    /// - [`HashError::NotRegularFile`] if `path` is not a regular file
    /// - [`HashError::NotFound`] / [`HashError::PermissionDenied`] /
    ///   [`HashError::Io`] if the file cannot be opened or read
    /// - [`HashError::Stalled`] if the file stays unreadable for
    ///   `max_read_stalls` consecutive timeouts
    ///
    /// A failed file is never partially reported: either the whole content
    /// was hashed or an error is returned.
    pub fn digest(&self, path: &Path) -> Result<(Digest, u64), HashError> {
        let mut file =
            open_nonblocking(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        let metadata = file
            .metadata()
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        if !metadata.is_file() {
            return Err(HashError::NotRegularFile(path.to_path_buf()));
        }

        self.hash_stream(&mut file, path)
    }

    /// Stream `source` through BLAKE3, waiting for readiness before each
    /// read. `path` is only used for error reporting.
    fn hash_stream<R: Pollable>(
        &self,
        source: &mut R,
        path: &Path,
    ) -> Result<(Digest, u64), HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.config.chunk_size];
        let mut total: u64 = 0;
        let mut stalls: u32 = 0;

        loop {
            let ready = wait_readable(source, self.config.read_timeout)
                .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
            if ready {
                match source.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        hasher.update(&buffer[..n]);
                        total += n as u64;
                        stalls = 0;
                        continue;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                    Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
                }
            }

            stalls += 1;
            log::trace!("Read stall {} on {}", stalls, path.display());
            if stalls >= self.config.max_read_stalls {
                return Err(HashError::Stalled {
                    path: path.to_path_buf(),
                    stalls,
                    timeout: self.config.read_timeout,
                });
            }
        }

        Ok((Digest::from(hasher.finalize()), total))
    }
}

/// A byte source the hasher can wait on before reading.
#[cfg(unix)]
trait Pollable: Read + std::os::unix::io::AsRawFd {}
#[cfg(unix)]
impl<T: Read + std::os::unix::io::AsRawFd> Pollable for T {}

#[cfg(not(unix))]
trait Pollable: Read {}
#[cfg(not(unix))]
impl<T: Read> Pollable for T {}

/// Open `path` read-only without blocking on FIFOs or devices.
#[cfg(unix)]
fn open_nonblocking(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

#[cfg(not(unix))]
fn open_nonblocking(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).open(path)
}

/// Wait up to `timeout` for `source` to become readable.
///
/// Returns `Ok(false)` on timeout. Hang-up and error conditions report
/// ready so that the following `read` surfaces them.
#[cfg(unix)]
fn wait_readable<R: Pollable>(source: &R, timeout: Duration) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    let mut pfd = libc::pollfd {
        fd: source.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: `pfd` is a valid, exclusively borrowed pollfd and nfds is 1.
    let ret = unsafe { libc::poll(&mut pfd, 1, millis) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(ret > 0)
}

#[cfg(not(unix))]
fn wait_readable<R: Pollable>(_source: &R, _timeout: Duration) -> io::Result<bool> {
    Ok(true)
}
