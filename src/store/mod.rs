//! Store Module
//!
//! The façade over the embedded engine. Every public operation maps onto
//! exactly one engine transaction.
//!
//! ## Layout
//! - `lifecycle`: open with retry, close, backup
//! - `bucket`: create/delete/list top-level buckets
//! - `record`: read/write/delete a key inside an existing bucket
//! - `traversal`: ordered walks, prefix scans, substring searches
//! - `batch`: resumable pagination over a bucket
//!
//! ## Concurrency Model
//!
//! - **Writes**: one write transaction at a time, serialized by the engine
//! - **Reads**: any number of read transactions, each pinned to the snapshot
//!   that was current when it began
//!
//! `Store` is `Send + Sync`; share it behind an `Arc`.

mod batch;
mod bucket;
mod lifecycle;
mod record;
mod traversal;

pub use batch::{Batch, Page};
pub use traversal::Entries;

use std::path::{Path, PathBuf};

use redb::{Database, ReadOnlyTable, ReadTransaction, TableDefinition, TableHandle, WriteTransaction};

use crate::config::Config;
use crate::error::{Result, StoreError};

/// Key type of every bucket table
pub(crate) type KeyType = &'static str;

/// Value type of every bucket table
pub(crate) type ValueType = &'static [u8];

/// A bucket opened inside a read transaction
pub(crate) type BucketReader = ReadOnlyTable<KeyType, ValueType>;

/// The engine refuses empty table names, so a bucket name must be non-empty
pub(crate) fn valid_bucket_name(name: &str) -> bool {
    !name.is_empty()
}

/// Table definition for a bucket; buckets map one-to-one onto engine tables
///
/// Callers check [`valid_bucket_name`] first.
pub(crate) fn bucket_table(name: &str) -> TableDefinition<'_, KeyType, ValueType> {
    TableDefinition::new(name)
}

/// Handle on an open database file
///
/// Owns the engine for its whole lifetime. Operations borrow it for the
/// duration of one transaction; [`Store::close`] consumes it.
pub struct Store {
    /// The underlying engine
    db: Database,

    /// Path the database was opened from
    path: PathBuf,

    /// Configuration used to open the store
    config: Config,
}

impl Store {
    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Transaction Helpers
    // =========================================================================

    pub(crate) fn begin_read(&self) -> Result<ReadTransaction> {
        self.db
            .begin_read()
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }

    pub(crate) fn begin_write(&self) -> std::result::Result<WriteTransaction, redb::TransactionError> {
        self.db.begin_write()
    }

    /// Open a bucket for reading, failing with `BucketNotExist` if absent
    pub(crate) fn open_bucket(txn: &ReadTransaction, bucket: &str) -> Result<BucketReader> {
        if !valid_bucket_name(bucket) {
            return Err(StoreError::BucketNotExist(bucket.to_string()));
        }

        match txn.open_table(bucket_table(bucket)) {
            Ok(table) => Ok(table),
            Err(redb::TableError::TableDoesNotExist(_)) => {
                Err(StoreError::BucketNotExist(bucket.to_string()))
            }
            Err(e) => Err(StoreError::Storage(e.to_string())),
        }
    }

    /// Check bucket existence inside a write transaction
    ///
    /// Opening a table in a write transaction creates it, so existence has to
    /// be checked against the table list first. This walks the table list,
    /// so it costs O(buckets) per write or delete.
    pub(crate) fn require_bucket(txn: &WriteTransaction, bucket: &str) -> Result<()> {
        if !valid_bucket_name(bucket) {
            return Err(StoreError::BucketNotExist(bucket.to_string()));
        }

        let mut tables = txn
            .list_tables()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        if tables.any(|handle| handle.name() == bucket) {
            Ok(())
        } else {
            Err(StoreError::BucketNotExist(bucket.to_string()))
        }
    }
}
