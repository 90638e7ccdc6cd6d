//! Record Operations
//!
//! Single-key reads and writes. The bucket must already exist: none of
//! these create it.

use redb::ReadableTable;

use crate::error::{Result, StoreError};

use super::{bucket_table, Store};

impl Store {
    /// Store `value` under `key`, replacing any previous value
    ///
    /// Keys must be non-empty; an empty key fails with `WriteFailed`.
    pub fn write(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        let write_failed = |reason: String| StoreError::WriteFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        if key.is_empty() {
            return Err(write_failed("key required".into()));
        }

        let txn = self.begin_write().map_err(|e| write_failed(e.to_string()))?;
        Self::require_bucket(&txn, bucket)?;

        {
            let mut table = txn
                .open_table(bucket_table(bucket))
                .map_err(|e| write_failed(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| write_failed(e.to_string()))?;
        }

        txn.commit().map_err(|e| write_failed(e.to_string()))?;

        tracing::trace!("Wrote {} bytes to {}/{}", value.len(), bucket, key);
        Ok(())
    }

    /// Get the value stored under `key`
    ///
    /// Returns:
    /// - `Ok(Some(value))` — key found (the value may be empty)
    /// - `Ok(None)` — bucket exists but the key does not
    /// - `Err(BucketNotExist)` — no such bucket
    pub fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.begin_read()?;
        let table = Self::open_bucket(&txn, bucket)?;

        let value = table
            .get(key)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(value.map(|guard| guard.value().to_vec()))
    }

    /// Remove `key` from the bucket; removing an absent key is a no-op
    pub fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let delete_failed = |reason: String| StoreError::DeleteFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let txn = self.begin_write().map_err(|e| delete_failed(e.to_string()))?;
        Self::require_bucket(&txn, bucket)?;

        let removed = {
            let mut table = txn
                .open_table(bucket_table(bucket))
                .map_err(|e| delete_failed(e.to_string()))?;
            let previous = table
                .remove(key)
                .map_err(|e| delete_failed(e.to_string()))?;
            previous.is_some()
        };

        txn.commit().map_err(|e| delete_failed(e.to_string()))?;

        tracing::trace!("Deleted {}/{} (present: {})", bucket, key, removed);
        Ok(())
    }
}
