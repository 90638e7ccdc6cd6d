//! Tests for ordered traversal and pagination
//!
//! These tests verify:
//! - Full walks and lazy iterators in key order
//! - Prefix scans (byte order, contiguous runs)
//! - Substring searches over keys and values
//! - Page-at-a-time reads that visit every key exactly once
//! - Snapshot isolation of open iterators

use std::collections::BTreeSet;

use bucketkv::{Batch, Store, StoreError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open_path(temp_dir.path().join("test.redb")).unwrap();
    (temp_dir, store)
}

/// Bucket with 50 "even" and 50 "odd" keys, written out of order
fn setup_even_odd_store() -> (TempDir, Store, Vec<String>, Vec<String>) {
    let (temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    let mut all = Vec::new();
    let mut even = Vec::new();

    for i in (0..100).rev() {
        let key = if i % 2 == 0 {
            let key = format!("even{}", i);
            even.push(key.clone());
            key
        } else {
            format!("odd{}", i)
        };
        store.write("bucket", &key, key.as_bytes()).unwrap();
        all.push(key);
    }

    all.sort();
    even.sort();
    (temp, store, all, even)
}

// =============================================================================
// Walk / Iterator Tests
// =============================================================================

#[test]
fn test_all_keys_complete_and_sorted() {
    let (_temp, store, all, _) = setup_even_odd_store();

    assert_eq!(store.all_keys("bucket").unwrap(), all);
}

#[test]
fn test_find_keys_substring() {
    let (_temp, store, _, even) = setup_even_odd_store();

    assert_eq!(store.find_keys("bucket", "even").unwrap(), even);

    // Substring, not prefix: "dd1" matches odd1, odd11, odd13, ..., odd19
    let found = store.find_keys("bucket", "dd1").unwrap();
    assert_eq!(found, vec!["odd1", "odd11", "odd13", "odd15", "odd17", "odd19"]);
}

#[test]
fn test_walk_bucket_visits_in_order() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    store.write("bucket", "c", b"3").unwrap();
    store.write("bucket", "a", b"1").unwrap();
    store.write("bucket", "b", b"2").unwrap();

    let mut seen = Vec::new();
    store
        .walk_bucket("bucket", |key, value| seen.push((key.to_string(), value.to_vec())))
        .unwrap();

    assert_eq!(
        seen,
        vec![
            ("a".to_string(), b"1".to_vec()),
            ("b".to_string(), b"2".to_vec()),
            ("c".to_string(), b"3".to_vec()),
        ]
    );
}

#[test]
fn test_iter_bucket_spans_many_chunks() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("big").unwrap();

    for i in 0..1000 {
        store.write("big", &format!("key{:04}", i), b"v").unwrap();
    }

    let keys: Vec<String> = store
        .iter_bucket("big")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();

    let expected: Vec<String> = (0..1000).map(|i| format!("key{:04}", i)).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_iterator_sees_snapshot() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    store.write("bucket", "a", b"old").unwrap();
    store.write("bucket", "b", b"old").unwrap();

    let entries = store.iter_bucket("bucket").unwrap();

    store.write("bucket", "a", b"new").unwrap();
    store.write("bucket", "c", b"new").unwrap();
    store.delete("bucket", "b").unwrap();

    let seen: Vec<(String, Vec<u8>)> = entries.map(|entry| entry.unwrap()).collect();
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), b"old".to_vec()),
            ("b".to_string(), b"old".to_vec()),
        ]
    );
}

#[test]
fn test_empty_bucket_walks_nothing() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("empty").unwrap();

    assert!(store.all_keys("empty").unwrap().is_empty());
    assert_eq!(store.iter_bucket("empty").unwrap().count(), 0);
}

#[test]
fn test_traversal_on_missing_bucket_fails() {
    let (_temp, store) = setup_temp_store();

    assert!(matches!(store.all_keys("nobucket"), Err(StoreError::BucketNotExist(_))));
    assert!(matches!(store.find_keys("nobucket", "x"), Err(StoreError::BucketNotExist(_))));
    assert!(matches!(store.iter_prefix("nobucket", "x"), Err(StoreError::BucketNotExist(_))));
    assert!(matches!(
        store.walk_bucket("nobucket", |_, _| {}),
        Err(StoreError::BucketNotExist(_))
    ));
    assert!(matches!(
        store.read_page("nobucket", "", 10),
        Err(StoreError::BucketNotExist(_))
    ));
}

// =============================================================================
// Prefix Tests
// =============================================================================

#[test]
fn test_walk_prefix_is_lexicographic() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    for key in ["10", "11", "2", "100"] {
        store.write("bucket", key, key.as_bytes()).unwrap();
    }

    let mut seen = Vec::new();
    store
        .walk_prefix("bucket", "1", |key, _| seen.push(key.to_string()))
        .unwrap();

    assert_eq!(seen, vec!["10", "100", "11"]);
}

#[test]
fn test_walk_prefix_stops_at_run_end() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    for key in ["app", "apple", "applesauce", "apply", "apricot", "banana", "ap"] {
        store.write("bucket", key, b"").unwrap();
    }

    let keys: Vec<String> = store
        .iter_prefix("bucket", "appl")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();

    assert_eq!(keys, vec!["apple", "applesauce", "apply"]);
}

#[test]
fn test_walk_prefix_no_match() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    store.write("bucket", "a", b"").unwrap();

    assert_eq!(store.iter_prefix("bucket", "z").unwrap().count(), 0);
    assert_eq!(store.iter_prefix("bucket", "0").unwrap().count(), 0);
}

#[test]
fn test_empty_prefix_matches_everything() {
    let (_temp, store, all, _) = setup_even_odd_store();

    let keys: Vec<String> = store
        .iter_prefix("bucket", "")
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();

    assert_eq!(keys, all);
}

#[test]
fn test_prefix_run_longer_than_chunk() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    for i in 0..600 {
        store.write("bucket", &format!("p/{:04}", i), b"").unwrap();
    }
    store.write("bucket", "q", b"").unwrap();
    store.write("bucket", "o", b"").unwrap();

    assert_eq!(store.iter_prefix("bucket", "p/").unwrap().count(), 600);
}

// =============================================================================
// Value Search Tests
// =============================================================================

#[test]
fn test_all_and_find_values() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    store.write("bucket", "b", b"hello world").unwrap();
    store.write("bucket", "a", b"goodbye").unwrap();
    store.write("bucket", "c", b"world peace").unwrap();

    assert_eq!(
        store.all_values("bucket").unwrap(),
        vec![b"goodbye".to_vec(), b"hello world".to_vec(), b"world peace".to_vec()]
    );
    assert_eq!(
        store.find_values("bucket", b"world").unwrap(),
        vec![b"hello world".to_vec(), b"world peace".to_vec()]
    );
}

// =============================================================================
// Pagination Tests
// =============================================================================

#[test]
fn test_read_page_covers_every_key_once() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    let expected: Vec<String> = (0..100).map(|i| format!("key{:03}", i)).collect();
    for key in &expected {
        store.write("bucket", key, key.as_bytes()).unwrap();
    }

    let mut seen = Vec::new();
    let mut resume = String::new();
    let mut calls = 0;

    loop {
        let page = store.read_page("bucket", &resume, 10).unwrap();
        calls += 1;
        assert!(page.items.len() <= 10);
        seen.extend(page.items.into_keys());

        if page.next.is_empty() {
            break;
        }
        resume = page.next;
        assert!(calls <= 20, "pagination did not terminate");
    }

    assert_eq!(seen, expected);
    let unique: BTreeSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), 100);
}

#[test]
fn test_read_page_partial_last_page() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    for i in 0..25 {
        store.write("bucket", &format!("k{:02}", i), b"v").unwrap();
    }

    let first = store.read_page("bucket", "", 10).unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.next, "k09");

    let second = store.read_page("bucket", &first.next, 10).unwrap();
    assert_eq!(second.items.keys().next().map(String::as_str), Some("k10"));
    assert_eq!(second.next, "k19");

    let third = store.read_page("bucket", &second.next, 10).unwrap();
    assert_eq!(third.items.len(), 5);
    assert!(third.is_last());
}

#[test]
fn test_read_page_resume_key_is_exclusive() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    for key in ["a", "b", "c"] {
        store.write("bucket", key, b"").unwrap();
    }

    let page = store.read_page("bucket", "a", 10).unwrap();
    assert_eq!(page.items.keys().collect::<Vec<_>>(), vec!["b", "c"]);

    // A resume key that is not itself stored still positions correctly
    let page = store.read_page("bucket", "bb", 10).unwrap();
    assert_eq!(page.items.keys().collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn test_read_page_zero_count_rejected() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    assert!(matches!(
        store.read_page("bucket", "", 0),
        Err(StoreError::InvalidArgument(_))
    ));
}

#[test]
fn test_read_page_empty_bucket() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();

    let page = store.read_page("bucket", "", 10).unwrap();
    assert!(page.items.is_empty());
    assert!(page.is_last());
}

#[test]
fn test_read_batch_loop() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    for i in 0..30 {
        store.write("bucket", &format!("k{:02}", i), b"v").unwrap();
    }

    let mut batch = Batch::new("bucket", 10);
    let mut seen = Vec::new();

    while !batch.is_finished() {
        store.read_batch(&mut batch).unwrap();
        seen.extend(batch.take_items().into_keys());
    }

    // 30 keys at 10 per page: the fourth read comes back empty and finishes
    assert_eq!(seen.len(), 30);
    assert_eq!(batch.next_key(), "");

    // A finished batch stays finished instead of starting over
    store.read_batch(&mut batch).unwrap();
    assert!(batch.items().is_empty());
    assert!(batch.is_finished());
}

#[test]
fn test_read_batch_resume_after() {
    let (_temp, store) = setup_temp_store();
    store.create_bucket("bucket").unwrap();
    for key in ["a", "b", "c", "d"] {
        store.write("bucket", key, b"").unwrap();
    }

    let mut batch = Batch::new("bucket", 2).resume_after("b");
    store.read_batch(&mut batch).unwrap();

    assert_eq!(batch.items().keys().collect::<Vec<_>>(), vec!["c", "d"]);
    assert_eq!(batch.next_key(), "d");
    assert!(!batch.is_finished());
}
