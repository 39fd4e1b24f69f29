//! `KeyValueStore` trait: the single persistence seam.
//!
//! Values are opaque strings (JSON in practice). Backends do not interpret
//! them; decoding and recovery from malformed data live in `ProgressStore`.

use async_trait::async_trait;

use crate::error::StorageError;

/// Backend-agnostic string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`. Absence is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`. Last writer wins.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
