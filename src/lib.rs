//! # bucketkv
//!
//! A bucket-scoped key/value store over a single-file embedded engine:
//! - Named top-level buckets holding ordered key → bytes mappings
//! - One atomic transaction per operation
//! - Ordered walks, prefix scans and resumable pagination
//! - Point-in-time backup of the whole file
//! - A CLI and a read-only HTML viewer on top
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │      bucketkv (CLI)      │   │  bucketkv-web (HTTP/HTML) │
//! └────────────┬─────────────┘   └─────────────┬────────────┘
//!              │                               │
//! ┌────────────▼───────────────────────────────▼────────────┐
//! │                          Store                           │
//! │   lifecycle · buckets · records · traversal · batch      │
//! └────────────────────────────┬────────────────────────────┘
//!                              │  one transaction per call
//!                       ┌──────▼──────┐
//!                       │    redb     │
//!                       │ (one file)  │
//!                       └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use bucketkv::Store;
//!
//! let store = Store::open_path("data.redb")?;
//! store.create_bucket("users")?;
//! store.write("users", "alice", b"admin")?;
//! assert_eq!(store.read("users", "alice")?, Some(b"admin".to_vec()));
//! store.close()?;
//! # Ok::<(), bucketkv::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod web;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::Config;
pub use store::{Batch, Entries, Page, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bucketkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
