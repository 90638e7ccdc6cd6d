//! Error types for bucketkv
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for bucketkv operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("cannot open database {}: {reason}", path.display())]
    CannotOpen { path: PathBuf, reason: String },

    #[error("could not close database: {0}")]
    CloseFailed(String),

    #[error("could not back up to {}: {reason}", path.display())]
    BackupFileError { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Bucket Errors
    // -------------------------------------------------------------------------
    #[error("bucket {0} does not exist")]
    BucketNotExist(String),

    #[error("bucket {bucket} not created: {reason}")]
    BucketNotCreated { bucket: String, reason: String },

    #[error("could not delete bucket {bucket}: {reason}")]
    BucketDeleteFailed { bucket: String, reason: String },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("could not write key {key} in bucket {bucket}: {reason}")]
    WriteFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("could not delete key {key} in bucket {bucket}: {reason}")]
    DeleteFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Engine Errors (read path)
    // -------------------------------------------------------------------------
    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),
}
