//! OffloadManager implementation for background task execution.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use smol_str::SmolStr;
use swbox_core::{CacheKey, Offload};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

/// Policy bounding the lifetime of an offloaded task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Let the task run to completion.
    None,
    /// Cancel the task if it has not completed within the duration.
    Cancel(Duration),
}

impl Default for TimeoutPolicy {
    /// Background revalidations are bounded so a hung network fetch cannot
    /// pile up tasks under sustained connectivity loss.
    fn default() -> Self {
        TimeoutPolicy::Cancel(Duration::from_secs(30))
    }
}

/// Key identifying an offloaded task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OffloadKey {
    /// Derived from a cache key; enables deduplication per cached entry.
    Cache(CacheKey),
    /// Auto-generated for tasks without a cache identity.
    Generated { kind: SmolStr, id: u64 },
}

#[derive(Debug)]
struct OffloadManagerInner {
    policy: TimeoutPolicy,
    tasks: DashMap<OffloadKey, JoinHandle<()>>,
    key_counter: AtomicU64,
}

/// Manager for offloading tasks to background execution.
///
/// Tasks spawned with a cache key are deduplicated: while a revalidation for
/// a key is in flight, further revalidations for the same key are skipped,
/// since both would write a presumably identical fresh response.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<OffloadManagerInner>,
}

impl OffloadManager {
    /// Create a new OffloadManager with the given timeout policy.
    pub fn new(policy: TimeoutPolicy) -> Self {
        OffloadManager {
            inner: Arc::new(OffloadManagerInner {
                policy,
                tasks: DashMap::new(),
                key_counter: AtomicU64::new(0),
            }),
        }
    }

    /// Create a new OffloadManager with the default policy.
    pub fn with_defaults() -> Self {
        Self::new(TimeoutPolicy::default())
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.inner
            .tasks
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .count()
    }

    /// Drop handles of finished tasks.
    pub fn cleanup_finished(&self) {
        self.inner.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Wait until every tracked task has completed.
    ///
    /// Polls with a yield between checks; intended for tests and orderly
    /// shutdown, not the request path.
    pub async fn wait_idle(&self) {
        loop {
            self.cleanup_finished();
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    fn spawn_inner<F>(&self, kind: SmolStr, key: OffloadKey, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let policy = self.inner.policy;
        let inner = Arc::clone(&self.inner);
        let span = info_span!("offload_task", kind = %kind, key = ?key);
        let task_key = key.clone();

        let handle = tokio::spawn(
            async move {
                match policy {
                    TimeoutPolicy::None => task.await,
                    TimeoutPolicy::Cancel(duration) => {
                        if tokio::time::timeout(duration, task).await.is_err() {
                            warn!(?duration, "offload task cancelled due to timeout");
                        }
                    }
                }
                inner.tasks.remove(&task_key);
            }
            .instrument(span),
        );
        self.inner.tasks.insert(key, handle);
    }
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Offload for OffloadManager {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let kind = kind.into();
        let key = OffloadKey::Generated {
            kind: kind.clone(),
            id: self.inner.key_counter.fetch_add(1, Ordering::Relaxed),
        };
        self.spawn_inner(kind, key, future);
    }

    fn spawn_keyed<F>(&self, kind: impl Into<SmolStr>, key: CacheKey, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = OffloadKey::Cache(key);
        if let Some(existing) = self.inner.tasks.get(&key)
            && !existing.is_finished()
        {
            debug!(?key, "task deduplicated - already in flight");
            return false;
        }
        self.spawn_inner(kind.into(), key, future);
        true
    }
}
