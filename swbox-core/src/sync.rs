//! Persisted deferred work for background synchronization.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageResult;

/// A unit of deferred work waiting for connectivity to return.
///
/// Items are persisted outside the engine's live memory so they survive
/// restarts between a failed send and the reconnect signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItem {
    /// The opaque payload to deliver (e.g. an analytics batch).
    pub payload: Bytes,
    /// When the item was enqueued.
    pub enqueued_at: DateTime<Utc>,
    /// How many delivery attempts have failed so far.
    pub attempts: u32,
}

impl SyncItem {
    /// Creates a fresh item enqueued now, with no failed attempts.
    pub fn new(payload: Bytes) -> Self {
        SyncItem {
            payload,
            enqueued_at: Utc::now(),
            attempts: 0,
        }
    }
}

/// Persistence seam for the background sync queue.
///
/// The queue's FIFO and at-least-once contracts are implemented on top of
/// this minimal surface, so they can be tested against an in-memory fake.
#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Appends an item at the tail of the queue.
    async fn append(&self, item: SyncItem) -> StorageResult<()>;

    /// Returns every queued item in FIFO order without removing anything.
    async fn peek_all(&self) -> StorageResult<Vec<SyncItem>>;

    /// Atomically replaces the queue contents. An empty slice clears it.
    async fn replace_all(&self, items: Vec<SyncItem>) -> StorageResult<()>;
}
