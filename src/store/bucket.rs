//! Bucket Manager
//!
//! Top-level buckets: create, delete, list and search.

use redb::TableHandle;

use crate::error::{Result, StoreError};

use super::{bucket_table, valid_bucket_name, Store};

impl Store {
    /// Create a bucket at the root of the database
    ///
    /// Creating a bucket that already exists succeeds and leaves its
    /// contents untouched. An empty name fails with `BucketNotCreated`.
    pub fn create_bucket(&self, bucket: &str) -> Result<()> {
        let not_created = |reason: String| StoreError::BucketNotCreated {
            bucket: bucket.to_string(),
            reason,
        };

        if !valid_bucket_name(bucket) {
            return Err(not_created("bucket name required".into()));
        }

        let txn = self.begin_write().map_err(|e| not_created(e.to_string()))?;
        txn.open_table(bucket_table(bucket))
            .map_err(|e| not_created(e.to_string()))?;
        txn.commit().map_err(|e| not_created(e.to_string()))?;

        tracing::debug!("Created bucket {}", bucket);
        Ok(())
    }

    /// Delete a bucket and every key in it
    ///
    /// Unlike [`Store::create_bucket`], this is strict: deleting a bucket
    /// that does not exist fails with `BucketDeleteFailed`.
    pub fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let delete_failed = |reason: String| StoreError::BucketDeleteFailed {
            bucket: bucket.to_string(),
            reason,
        };

        if !valid_bucket_name(bucket) {
            return Err(delete_failed("bucket name required".into()));
        }

        let txn = self.begin_write().map_err(|e| delete_failed(e.to_string()))?;
        let existed = txn
            .delete_table(bucket_table(bucket))
            .map_err(|e| delete_failed(e.to_string()))?;

        // Dropping the uncommitted transaction aborts it
        if !existed {
            return Err(delete_failed("bucket does not exist".into()));
        }

        txn.commit().map_err(|e| delete_failed(e.to_string()))?;

        tracing::debug!("Deleted bucket {}", bucket);
        Ok(())
    }

    /// Check whether a bucket exists
    pub fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let txn = self.begin_read()?;
        match Self::open_bucket(&txn, bucket) {
            Ok(_) => Ok(true),
            Err(StoreError::BucketNotExist(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// List every bucket name in ascending order
    pub fn all_buckets(&self) -> Result<Vec<String>> {
        let txn = self.begin_read()?;
        let mut names: Vec<String> = txn
            .list_tables()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .map(|handle| handle.name().to_string())
            .collect();

        names.sort_unstable();
        Ok(names)
    }

    /// List bucket names containing `needle` (case-sensitive)
    pub fn find_buckets(&self, needle: &str) -> Result<Vec<String>> {
        let mut names = self.all_buckets()?;
        names.retain(|name| name.contains(needle));
        Ok(names)
    }
}
