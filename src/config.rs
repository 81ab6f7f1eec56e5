//! Scan configuration layered with figment.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. An optional TOML file passed with `--config`
//! 3. Flags given explicitly on the command line ([`ConfigOverrides`])
//!
//! No environment variables are consulted.
//!
//! ```toml
//! workers = 8
//! queue_capacity = 256
//! read_timeout_ms = 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::duplicates::finder::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use crate::duplicates::FinderConfig;
use crate::scanner::hasher::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_READ_STALLS};
use crate::scanner::HasherConfig;

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file given with `--config` does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or has the wrong shape.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid configuration: {field} {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Tunables of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of hashing workers
    pub workers: usize,
    /// Capacity of the walker → worker queue
    pub queue_capacity: usize,
    /// Idle worker wait before re-checking for completion, in milliseconds
    pub dequeue_timeout_ms: u64,
    /// Readiness wait per read, in milliseconds
    pub read_timeout_ms: u64,
    /// Read buffer size in bytes
    pub chunk_size: usize,
    /// Consecutive timed-out reads before a file is abandoned
    pub max_read_stalls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dequeue_timeout_ms: 100,
            read_timeout_ms: 1000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_read_stalls: DEFAULT_MAX_READ_STALLS,
        }
    }
}

/// Values set explicitly on the command line. `None` leaves the lower
/// layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// `--workers`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// `--queue-capacity`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
    /// `--read-timeout-ms`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,
}

impl Config {
    /// Build the effective configuration from all layers and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing or malformed, or if the
    /// merged result fails [`validate`](Self::validate).
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Serialized::defaults(overrides));

        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        log::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("workers", self.workers == 0),
            ("queue_capacity", self.queue_capacity == 0),
            ("dequeue_timeout_ms", self.dequeue_timeout_ms == 0),
            ("chunk_size", self.chunk_size == 0),
            ("max_read_stalls", self.max_read_stalls == 0),
            ("read_timeout_ms", self.read_timeout_ms == 0),
        ];
        match checks.into_iter().find(|(_, bad)| *bad) {
            Some((field, _)) => Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero",
            }),
            None => Ok(()),
        }
    }

    /// Convert into the library's finder configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_queue_capacity(self.queue_capacity)
            .with_dequeue_timeout(Duration::from_millis(self.dequeue_timeout_ms))
            .with_hasher_config(HasherConfig {
                chunk_size: self.chunk_size,
                read_timeout: Duration::from_millis(self.read_timeout_ms),
                max_read_stalls: self.max_read_stalls,
            })
    }
}
