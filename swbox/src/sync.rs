//! The background sync queue.
//!
//! Work that fails to reach the server while offline is persisted as
//! [`SyncItem`]s and replayed in FIFO order when the host signals that
//! connectivity returned. Delivery is at-least-once: the queue is
//! re-persisted after every successful send, so a crash mid-drain can replay
//! an already-delivered item but never lose an undelivered one.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use swbox_core::{FetchError, SyncItem, SyncStore};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::EngineError;

/// Delivery seam for queued sync items.
///
/// The transport decides what a payload means on the wire (typically a POST
/// to an ingest endpoint). An `Err` marks the item as failed and stops the
/// drain; the item stays queued for the next reconnect signal.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Attempts to deliver one item to the server.
    async fn deliver(&self, item: &SyncItem) -> Result<(), FetchError>;
}

/// Persisted FIFO queue of deferred work.
pub struct SyncQueue {
    store: Arc<dyn SyncStore>,
    transport: Arc<dyn SyncTransport>,
    drain_lock: Mutex<()>,
}

impl SyncQueue {
    /// Creates a queue over the given persistence and delivery seams.
    pub fn new(store: Arc<dyn SyncStore>, transport: Arc<dyn SyncTransport>) -> Self {
        SyncQueue {
            store,
            transport,
            drain_lock: Mutex::new(()),
        }
    }

    /// Enqueues a payload for deferred delivery.
    pub async fn enqueue(&self, payload: Bytes) -> Result<(), EngineError> {
        let item = SyncItem::new(payload);
        debug!(bytes = item.payload.len(), "enqueueing sync item");
        self.store.append(item).await?;
        Ok(())
    }

    /// Number of items currently queued.
    pub async fn len(&self) -> Result<usize, EngineError> {
        Ok(self.store.peek_all().await?.len())
    }

    /// Whether the queue is empty.
    pub async fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.len().await? == 0)
    }

    /// Replays queued items in FIFO order until the queue is empty or a
    /// delivery fails.
    ///
    /// On failure the failed item's attempt count is bumped and it stays at
    /// the head, preserving order for the next drain. Concurrent drain calls
    /// coalesce: while one drain is running, others return immediately
    /// having delivered nothing.
    ///
    /// Returns how many items this call delivered.
    #[instrument(skip(self))]
    pub async fn drain(&self) -> Result<usize, EngineError> {
        let Ok(_guard) = self.drain_lock.try_lock() else {
            debug!("drain already in progress; coalescing");
            return Ok(0);
        };

        let mut pending = self.store.peek_all().await?;
        let mut delivered = 0;

        while let Some(item) = pending.first().cloned() {
            match self.transport.deliver(&item).await {
                Ok(()) => {
                    pending.remove(0);
                    // Persist after every success so a crash mid-drain
                    // re-sends at most the in-flight item.
                    self.store.replace_all(pending.clone()).await?;
                    delivered += 1;
                }
                Err(error) => {
                    warn!(
                        %error,
                        attempts = item.attempts + 1,
                        "delivery failed; stopping drain"
                    );
                    pending[0].attempts += 1;
                    self.store.replace_all(pending).await?;
                    return Ok(delivered);
                }
            }
        }

        if delivered > 0 {
            info!(delivered, "sync queue drained");
        }
        Ok(delivered)
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue").finish_non_exhaustive()
    }
}
