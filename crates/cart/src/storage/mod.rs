//! Key-value persistence backends for the cart.
//!
//! The store only ever needs two operations: read the value under a key and
//! replace it. Values are opaque strings (the store writes JSON).
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local map, useful for tests and previews
//! - [`FileStorage`] - one file per key inside a directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

pub(crate) use file::validate_key;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used by this backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value storage addressed by string keys.
#[async_trait]
pub trait CartStorage: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
