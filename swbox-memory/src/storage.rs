//! DashMap-backed cache storage.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use smol_str::SmolStr;
use swbox_core::{
    CacheKey, CacheStore, CacheStorage, CachedEntry, DeleteStatus, StorageResult,
};

/// One in-memory cache store.
///
/// Reads and writes are lock-free on the hot path; per-key last-write-wins
/// semantics come straight from the underlying map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<CacheKey, CachedEntry>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, key: &CacheKey) -> StorageResult<Option<CachedEntry>> {
        Ok(self.entries.get(key).map(|entry| entry.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: CachedEntry) -> StorageResult<()> {
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StorageResult<DeleteStatus> {
        match self.entries.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> StorageResult<Vec<CacheKey>> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }
}

/// An in-memory set of named cache stores.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stores: DashMap<SmolStr, Arc<MemoryStore>>,
}

impl MemoryStorage {
    /// Creates empty storage with no stores.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> StorageResult<Arc<dyn CacheStore>> {
        let store = self
            .stores
            .entry(SmolStr::new(name))
            .or_insert_with(|| Arc::new(MemoryStore::new()))
            .clone();
        Ok(store)
    }

    async fn delete(&self, name: &str) -> StorageResult<DeleteStatus> {
        match self.stores.remove(name) {
            Some((_, store)) => Ok(DeleteStatus::Deleted(store.len() as u32)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn list(&self) -> StorageResult<Vec<SmolStr>> {
        Ok(self.stores.iter().map(|entry| entry.key().clone()).collect())
    }
}
