//! Configuration for bucketkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a bucketkv store and its front ends
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the single database file
    pub path: PathBuf,

    /// Engine page cache size in bytes (engine default when unset)
    pub cache_size: Option<usize>,

    // -------------------------------------------------------------------------
    // Open Retry Configuration
    // -------------------------------------------------------------------------
    /// How many times to try opening a locked file before giving up
    pub open_attempts: u32,

    /// Wait before the second attempt; doubles after every failed attempt
    pub open_backoff_ms: u64,

    // -------------------------------------------------------------------------
    // Web Viewer Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,

    /// Number of request worker threads
    pub workers: usize,

    /// Keys shown per page when listing a bucket
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./bucketkv.redb"),
            cache_size: None,
            open_attempts: 10,
            open_backoff_ms: 2,
            listen_addr: "127.0.0.1:5000".to_string(),
            workers: 4,
            page_size: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values that would otherwise break an operation later
    pub fn validate(&self) -> Result<()> {
        if self.open_attempts == 0 {
            return Err(StoreError::Config("open_attempts must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(StoreError::Config("workers must be at least 1".into()));
        }
        if self.page_size == 0 {
            return Err(StoreError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Backoff to sleep after failed attempt number `attempt` (0-based)
    pub fn open_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.open_backoff_ms.saturating_mul(factor))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the engine cache size (in bytes)
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = Some(bytes);
        self
    }

    /// Set the number of open attempts
    pub fn open_attempts(mut self, attempts: u32) -> Self {
        self.config.open_attempts = attempts;
        self
    }

    /// Set the initial open backoff (in milliseconds)
    pub fn open_backoff_ms(mut self, ms: u64) -> Self {
        self.config.open_backoff_ms = ms;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of web worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the key listing page size
    pub fn page_size(mut self, count: usize) -> Self {
        self.config.page_size = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
