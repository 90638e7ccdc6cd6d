//! Lifecycle Manager
//!
//! Opening (with bounded retry on a held file lock), closing and backing up
//! the database file.

use std::fs::{self, File};
use std::path::Path;
use std::thread;

use redb::{Database, DatabaseError, ReadableTable, TableHandle};

use crate::config::Config;
use crate::error::{Result, StoreError};

use super::{bucket_table, Store};

impl Store {
    /// Open or create the database described by `config`
    ///
    /// Another process holding the file lock is retried with a doubling
    /// backoff for up to `config.open_attempts` tries. Every other failure
    /// (missing parent directory, corrupt file, ...) is returned at once.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let path = config.path.clone();
        let mut last_error = String::new();

        for attempt in 0..config.open_attempts {
            let mut builder = Database::builder();
            if let Some(cache_size) = config.cache_size {
                builder.set_cache_size(cache_size);
            }

            match builder.create(&path) {
                Ok(db) => {
                    tracing::info!("Opened database {} (attempt {})", path.display(), attempt + 1);
                    return Ok(Self { db, path, config });
                }
                Err(DatabaseError::DatabaseAlreadyOpen) => {
                    last_error = DatabaseError::DatabaseAlreadyOpen.to_string();

                    if attempt + 1 < config.open_attempts {
                        let wait = config.open_backoff(attempt);
                        tracing::warn!(
                            "Database {} is locked, retrying in {:?} ({}/{})",
                            path.display(),
                            wait,
                            attempt + 1,
                            config.open_attempts
                        );
                        thread::sleep(wait);
                    }
                }
                Err(e) => {
                    return Err(StoreError::CannotOpen {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(StoreError::CannotOpen {
            reason: format!("{} (gave up after {} attempts)", last_error, config.open_attempts),
            path,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified database file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Close the database
    ///
    /// Commits a final empty write transaction so everything is flushed,
    /// then releases the file and its lock.
    pub fn close(self) -> Result<()> {
        let txn = self
            .begin_write()
            .map_err(|e| StoreError::CloseFailed(e.to_string()))?;
        txn.commit()
            .map_err(|e| StoreError::CloseFailed(e.to_string()))?;

        let Store { db, path, .. } = self;
        drop(db);

        tracing::info!("Closed database {}", path.display());
        Ok(())
    }

    /// Copy a consistent snapshot of the whole database to `destination`
    ///
    /// The copy is taken from a single read transaction, so concurrent
    /// writers neither block it nor leak into it. The result is a regular
    /// database file that [`Store::open`] accepts.
    pub fn backup(&self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let backup_error = |reason: String| StoreError::BackupFileError {
            path: destination.to_path_buf(),
            reason,
        };

        if is_same_file(&self.path, destination) {
            return Err(backup_error("destination is the live database file".into()));
        }

        let txn = self.begin_read()?;

        let file = File::create(destination).map_err(|e| backup_error(e.to_string()))?;
        let target = Database::builder()
            .create_file(file)
            .map_err(|e| backup_error(e.to_string()))?;
        let out = target
            .begin_write()
            .map_err(|e| backup_error(e.to_string()))?;

        let mut buckets = 0usize;
        let mut entries = 0u64;

        let names: Vec<String> = txn
            .list_tables()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .map(|handle| handle.name().to_string())
            .collect();

        for name in names {
            let source = Self::open_bucket(&txn, &name)?;
            let mut sink = out
                .open_table(bucket_table(&name))
                .map_err(|e| backup_error(e.to_string()))?;

            for item in source.iter().map_err(|e| StoreError::Storage(e.to_string()))? {
                let (key, value) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
                sink.insert(key.value(), value.value())
                    .map_err(|e| backup_error(e.to_string()))?;
                entries += 1;
            }
            buckets += 1;
        }

        out.commit().map_err(|e| backup_error(e.to_string()))?;

        tracing::info!(
            "Backed up {} buckets ({} entries) to {}",
            buckets,
            entries,
            destination.display()
        );
        Ok(())
    }
}

/// True when both paths resolve to the same existing file
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
