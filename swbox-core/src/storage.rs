//! Platform cache storage traits.
//!
//! The host platform owns a persistent set of named cache stores, each a
//! mapping from [`CacheKey`] to [`CachedEntry`] that survives engine
//! restarts. [`CacheStorage`] is the set; [`CacheStore`] is one store.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;
use thiserror::Error;

use crate::entry::CachedEntry;
use crate::key::CacheKey;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Internal storage error, state or computation error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),

    /// The platform denied access to storage (quota, permissions).
    #[error("storage access denied: {0}")]
    Denied(String),
}

impl StorageError {
    /// Wraps an arbitrary platform error.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Internal(Box::new(error))
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result of deleting a cache entry or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The given number of items was deleted.
    Deleted(u32),
    /// Nothing matched; nothing was deleted.
    Missing,
}

/// One named cache store: a persistent mapping from request identity to
/// response snapshot.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the entry for a key, if present.
    async fn read(&self, key: &CacheKey) -> StorageResult<Option<CachedEntry>>;

    /// Writes an entry, silently replacing any previous entry for the key.
    async fn write(&self, key: &CacheKey, entry: CachedEntry) -> StorageResult<()>;

    /// Removes the entry for a key.
    async fn remove(&self, key: &CacheKey) -> StorageResult<DeleteStatus>;

    /// Lists every key currently present in the store.
    async fn keys(&self) -> StorageResult<Vec<CacheKey>>;
}

/// The platform's persistent set of named cache stores.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens a store by name, creating it if absent. Idempotent.
    async fn open(&self, name: &str) -> StorageResult<Arc<dyn CacheStore>>;

    /// Deletes a whole store and everything in it.
    async fn delete(&self, name: &str) -> StorageResult<DeleteStatus>;

    /// Lists the names of every existing store.
    async fn list(&self) -> StorageResult<Vec<SmolStr>>;
}
