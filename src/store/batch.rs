//! Pagination
//!
//! Reads a bucket a bounded page at a time. The caller keeps the resume
//! token (the last key of the previous page) between calls.
//!
//! ## Resume Semantics
//!
//! The resume key is exclusive: a page starts strictly after it, so feeding
//! each page's `next` back in visits every entry exactly once. A page that
//! comes back with fewer than `count` entries reached the end of the bucket
//! and carries an empty `next`.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::{Result, StoreError};

use super::traversal::collect_range;
use super::Store;

/// One page of a paginated scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Entries of this page, ordered by key
    pub items: BTreeMap<String, Vec<u8>>,

    /// Resume token for the following page; empty when the scan is complete
    pub next: String,
}

impl Page {
    /// True when no further page follows
    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }
}

/// Caller-owned pagination state for [`Store::read_batch`]
///
/// ```ignore
/// let mut batch = Batch::new("users", 100);
/// while !batch.is_finished() {
///     store.read_batch(&mut batch)?;
///     for (key, value) in batch.items() { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Batch {
    bucket: String,
    count: usize,
    next: String,
    items: BTreeMap<String, Vec<u8>>,
    finished: bool,
}

impl Batch {
    /// Start a scan of `bucket` from its first key, `count` entries per page
    pub fn new(bucket: impl Into<String>, count: usize) -> Self {
        Self {
            bucket: bucket.into(),
            count,
            next: String::new(),
            items: BTreeMap::new(),
            finished: false,
        }
    }

    /// Resume a scan after `key` (a token from an earlier page)
    pub fn resume_after(mut self, key: impl Into<String>) -> Self {
        self.next = key.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Resume token; empty before the first read and after the last
    pub fn next_key(&self) -> &str {
        &self.next
    }

    /// Entries of the most recent page
    pub fn items(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.items
    }

    /// Move the most recent page's entries out
    pub fn take_items(&mut self) -> BTreeMap<String, Vec<u8>> {
        std::mem::take(&mut self.items)
    }

    /// True once a read reached the end of the bucket
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Store {
    /// Read up to `count` entries following `resume_key`
    ///
    /// An empty `resume_key` starts at the first key of the bucket.
    pub fn read_page(&self, bucket: &str, resume_key: &str, count: usize) -> Result<Page> {
        if count == 0 {
            return Err(StoreError::InvalidArgument(
                "page size must be at least 1".into(),
            ));
        }

        let txn = self.begin_read()?;
        let table = Self::open_bucket(&txn, bucket)?;

        let start = if resume_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(resume_key)
        };

        let chunk = collect_range(&table, start, None, count)?;

        let next = match chunk.entries.last() {
            Some((key, _)) if chunk.entries.len() == count => key.clone(),
            _ => String::new(),
        };

        tracing::trace!(
            "Read page of {} entries from {} after {:?}",
            chunk.entries.len(),
            bucket,
            resume_key
        );

        Ok(Page {
            items: chunk.entries.into_iter().collect(),
            next,
        })
    }

    /// Read the next page of `batch`, replacing its items
    ///
    /// Once the batch is finished further calls leave it empty instead of
    /// starting over.
    pub fn read_batch(&self, batch: &mut Batch) -> Result<()> {
        if batch.finished {
            batch.items.clear();
            return Ok(());
        }

        let page = self.read_page(&batch.bucket, &batch.next, batch.count)?;

        batch.finished = page.is_last();
        batch.items = page.items;
        batch.next = page.next;
        Ok(())
    }
}
