//! Error types for the file-backed store.

use thiserror::Error;

/// Errors that can occur during `FsStore` operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the on-disk record.
    #[error("Failed to parse state record: {0}")]
    Parse(String),

    /// Failed to serialize the record for writing.
    #[error("Failed to serialize state record: {0}")]
    Serialize(String),
}
