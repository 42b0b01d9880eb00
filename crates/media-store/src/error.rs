//! Object store error types.

use thiserror::Error;

/// Errors that can occur when storing or reading objects.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Result type for object store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
