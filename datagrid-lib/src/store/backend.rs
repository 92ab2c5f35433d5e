//! Storage backend trait.

use async_trait::async_trait;

use crate::error::PersistenceError;

/// Raw byte storage behind the view-state store.
///
/// Implementations handle storage and retrieval only; serialization, merging
/// and expiry belong to [`super::ViewStateStore`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get raw bytes for a key.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Set raw bytes for a key.
    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), PersistenceError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), PersistenceError>;

    /// Get all keys starting with a prefix.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PersistenceError>;
}
