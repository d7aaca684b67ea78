//! Mutex-guarded in-memory sync store.

use async_trait::async_trait;
use swbox_core::{StorageResult, SyncItem, SyncStore};
use tokio::sync::Mutex;

/// In-memory FIFO store for pending sync items.
#[derive(Debug, Default)]
pub struct MemorySyncStore {
    items: Mutex<Vec<SyncItem>>,
}

impl MemorySyncStore {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SyncStore for MemorySyncStore {
    async fn append(&self, item: SyncItem) -> StorageResult<()> {
        self.items.lock().await.push(item);
        Ok(())
    }

    async fn peek_all(&self) -> StorageResult<Vec<SyncItem>> {
        Ok(self.items.lock().await.clone())
    }

    async fn replace_all(&self, items: Vec<SyncItem>) -> StorageResult<()> {
        *self.items.lock().await = items;
        Ok(())
    }
}
