//! The cache registry.
//!
//! Owns the set of named, versioned cache stores. Strategies read and write
//! exclusively through the registry, which applies the version tag to every
//! logical name, refuses to cache error responses, and swallows (but logs)
//! write failures so caching stays best-effort: a storage hiccup must never
//! fail a user-visible response.

use std::sync::Arc;

use smol_str::SmolStr;
use swbox_core::{
    CacheKey, CacheStorage, CacheStore, CachedEntry, FetchResponse, StorageError, StorageResult,
};
use tracing::{debug, warn};

use crate::config::EngineConfig;

/// Registry of versioned cache stores.
#[derive(Clone)]
pub struct CacheRegistry {
    storage: Arc<dyn CacheStorage>,
    config: Arc<EngineConfig>,
}

impl CacheRegistry {
    /// Creates a registry over the given platform storage.
    pub fn new(storage: Arc<dyn CacheStorage>, config: Arc<EngineConfig>) -> Self {
        CacheRegistry { storage, config }
    }

    /// The configuration this registry was constructed with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opens the current-version store for a logical name, creating it if
    /// absent. Idempotent.
    pub async fn open(&self, logical: &str) -> StorageResult<Arc<dyn CacheStore>> {
        self.storage.open(&self.config.store_name(logical)).await
    }

    /// Looks up an entry in one logical store.
    ///
    /// Read errors are logged and treated as a miss; the caller falls back
    /// to the network or the offline response either way.
    pub async fn lookup(&self, logical: &str, key: &CacheKey) -> Option<CachedEntry> {
        let store = match self.open(logical).await {
            Ok(store) => store,
            Err(error) => {
                warn!(%key, logical, %error, "failed to open store for lookup");
                return None;
            }
        };
        match store.read(key).await {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%key, logical, %error, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Looks up an entry across all current-version stores, in config order
    /// (static first, then dynamic).
    pub async fn lookup_any(&self, key: &CacheKey) -> Option<CachedEntry> {
        for logical in [&self.config.static_store, &self.config.dynamic_store] {
            if let Some(entry) = self.lookup(logical, key).await {
                return Some(entry);
            }
        }
        None
    }

    /// Writes a response snapshot for a key, best-effort.
    ///
    /// Error responses are never cached. Write failures are logged and
    /// swallowed. Returns whether an entry was written.
    pub async fn store(&self, logical: &str, key: &CacheKey, response: &FetchResponse) -> bool {
        if !response.is_success() {
            debug!(%key, status = %response.status(), "not caching non-success response");
            return false;
        }
        let store = match self.open(logical).await {
            Ok(store) => store,
            Err(error) => {
                warn!(%key, logical, %error, "failed to open store for write");
                return false;
            }
        };
        match store.write(key, CachedEntry::from(response)).await {
            Ok(()) => true,
            Err(error) => {
                warn!(%key, logical, %error, "cache write failed; response served anyway");
                false
            }
        }
    }

    /// Deletes every existing store whose name is not in `current`.
    ///
    /// Returns how many stores were deleted. Used by activation to garbage
    /// collect prior-version stores; the name encodes the version, so the
    /// same logical store at an older version is removed too.
    pub async fn delete_stores_not_in(&self, current: &[SmolStr]) -> Result<usize, StorageError> {
        let mut removed = 0;
        for name in self.storage.list().await? {
            if current.contains(&name) {
                continue;
            }
            debug!(store = %name, "deleting store from a previous version");
            self.storage.delete(&name).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("version", &self.config.version)
            .field("stores", &self.config.current_store_names())
            .finish()
    }
}
