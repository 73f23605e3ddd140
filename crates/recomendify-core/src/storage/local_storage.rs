//! Local storage trait.
//!
//! A string-keyed, string-valued store that survives restarts, shaped like a
//! browser's `localStorage`. Implementations live in recomendify-infra.

use recomendify_types::error::StorageError;

/// Persistent key-value storage for client state.
pub trait LocalStorage: Send + Sync {
    /// Get a value by key. Returns `None` if the key does not exist.
    fn get_item(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Set a value for a key (upsert).
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn remove_item(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// All stored keys, sorted.
    fn keys(&self) -> impl std::future::Future<Output = Result<Vec<String>, StorageError>> + Send;
}
