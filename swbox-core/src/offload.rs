//! Offload trait for background task execution.

use std::future::Future;

use smol_str::SmolStr;

use crate::key::CacheKey;

/// Trait for spawning background tasks.
///
/// Lets the strategies detach work (stale-while-revalidate's background
/// refresh) without blocking the response path. Implementations should share
/// state via `Arc` so clones observe the same in-flight tasks.
pub trait Offload: Send + Sync + Clone {
    /// Spawn a future to be executed in the background.
    ///
    /// `kind` labels the task for tracing (e.g. "revalidate").
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawn a background task identified by a cache key.
    ///
    /// Implementations may deduplicate: if a task for the same key is
    /// already in flight, the new one is skipped. Returns whether the task
    /// was spawned.
    fn spawn_keyed<F>(&self, kind: impl Into<SmolStr>, key: CacheKey, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = key;
        self.spawn(kind, future);
        true
    }
}
