//! Traversal Engine
//!
//! Ordered scans over a bucket. Every scan runs inside one read transaction,
//! so it sees a single snapshot no matter what writers do meanwhile.
//!
//! # Chunked Cursor
//!
//! [`Entries`] does not materialize the bucket. It pulls entries from the
//! engine in chunks of [`CHUNK_SIZE`], re-seeking just past the last key it
//! returned when a chunk runs out.

use std::collections::VecDeque;
use std::ops::Bound;

use redb::ReadableTable;

use crate::error::{Result, StoreError};

use super::{BucketReader, Store};

/// Entries fetched from the engine per refill
const CHUNK_SIZE: usize = 256;

/// A key/value pair as returned by scans
pub type Entry = (String, Vec<u8>);

/// One pass over a key range
pub(crate) struct Chunk {
    pub entries: Vec<Entry>,

    /// True when the range (or the prefix run) ended inside this chunk
    pub exhausted: bool,
}

/// Collect up to `limit` entries starting at `start`
///
/// With a prefix, collection stops at the first key that does not start with
/// it. Keys are ordered byte-wise, so every key sharing a prefix sits in one
/// contiguous run beginning at the first key `>= prefix`.
pub(crate) fn collect_range(
    table: &BucketReader,
    start: Bound<&str>,
    prefix: Option<&str>,
    limit: usize,
) -> Result<Chunk> {
    let range = table
        .range::<&str>((start, Bound::Unbounded))
        .map_err(|e| StoreError::Storage(e.to_string()))?;

    let mut entries = Vec::with_capacity(limit.min(CHUNK_SIZE));

    for item in range {
        if entries.len() >= limit {
            return Ok(Chunk {
                entries,
                exhausted: false,
            });
        }

        let (key, value) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
        let key = key.value();

        if let Some(prefix) = prefix {
            if !key.as_bytes().starts_with(prefix.as_bytes()) {
                return Ok(Chunk {
                    entries,
                    exhausted: true,
                });
            }
        }

        entries.push((key.to_string(), value.value().to_vec()));
    }

    Ok(Chunk {
        entries,
        exhausted: true,
    })
}

/// Lazy, ordered iterator over a bucket's entries
///
/// Produced by [`Store::iter_bucket`] and [`Store::iter_prefix`]. Holds the
/// read snapshot open until dropped. An engine error is yielded once, after
/// which the iterator is fused.
pub struct Entries {
    /// Bucket opened in the snapshot transaction
    table: BucketReader,

    /// Entries fetched but not yet yielded
    buffer: VecDeque<Entry>,

    /// Last key handed to the buffer; the next refill starts after it
    last_key: Option<String>,

    /// Only keys starting with this are yielded
    prefix: Option<String>,

    /// No more refills needed
    exhausted: bool,
}

impl Entries {
    fn new(table: BucketReader, prefix: Option<String>) -> Self {
        Self {
            table,
            buffer: VecDeque::new(),
            last_key: None,
            prefix,
            exhausted: false,
        }
    }

    fn refill(&mut self) -> Result<()> {
        let start = match (&self.last_key, &self.prefix) {
            (Some(last), _) => Bound::Excluded(last.as_str()),
            (None, Some(prefix)) => Bound::Included(prefix.as_str()),
            (None, None) => Bound::Unbounded,
        };

        let chunk = collect_range(&self.table, start, self.prefix.as_deref(), CHUNK_SIZE)?;

        self.exhausted = chunk.exhausted;
        if let Some((key, _)) = chunk.entries.last() {
            self.last_key = Some(key.clone());
        }
        self.buffer.extend(chunk.entries);
        Ok(())
    }
}

impl Iterator for Entries {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.refill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}

impl Store {
    // =========================================================================
    // Iterators
    // =========================================================================

    /// Iterate every entry of a bucket in ascending key order
    pub fn iter_bucket(&self, bucket: &str) -> Result<Entries> {
        let txn = self.begin_read()?;
        let table = Self::open_bucket(&txn, bucket)?;
        Ok(Entries::new(table, None))
    }

    /// Iterate the entries whose key starts with `prefix`, in ascending order
    pub fn iter_prefix(&self, bucket: &str, prefix: &str) -> Result<Entries> {
        let txn = self.begin_read()?;
        let table = Self::open_bucket(&txn, bucket)?;
        Ok(Entries::new(table, Some(prefix.to_string())))
    }

    // =========================================================================
    // Walks
    // =========================================================================

    /// Call `visit` with the name of every bucket at the root
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        for name in self.all_buckets()? {
            visit(&name);
        }
        Ok(())
    }

    /// Call `visit` for every key/value pair in the bucket
    pub fn walk_bucket<F>(&self, bucket: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, &[u8]),
    {
        for entry in self.iter_bucket(bucket)? {
            let (key, value) = entry?;
            visit(&key, &value);
        }
        Ok(())
    }

    /// Call `visit` for every key/value pair whose key starts with `prefix`
    pub fn walk_prefix<F>(&self, bucket: &str, prefix: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, &[u8]),
    {
        for entry in self.iter_prefix(bucket, prefix)? {
            let (key, value) = entry?;
            visit(&key, &value);
        }
        Ok(())
    }

    // =========================================================================
    // Searches
    // =========================================================================

    /// All keys of the bucket, in order
    pub fn all_keys(&self, bucket: &str) -> Result<Vec<String>> {
        self.iter_bucket(bucket)?
            .map(|entry| entry.map(|(key, _)| key))
            .collect()
    }

    /// Keys containing `needle` anywhere (substring, not prefix), in order
    pub fn find_keys(&self, bucket: &str, needle: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in self.iter_bucket(bucket)? {
            let (key, _) = entry?;
            if key.contains(needle) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// All values of the bucket, in key order
    pub fn all_values(&self, bucket: &str) -> Result<Vec<Vec<u8>>> {
        self.iter_bucket(bucket)?
            .map(|entry| entry.map(|(_, value)| value))
            .collect()
    }

    /// Values containing the byte string `needle`, in key order
    pub fn find_values(&self, bucket: &str, needle: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        for entry in self.iter_bucket(bucket)? {
            let (_, value) = entry?;
            if contains_bytes(&value, needle) {
                values.push(value);
            }
        }
        Ok(values)
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
