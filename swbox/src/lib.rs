#![doc = include_str!("../README.md")]

/// Engine configuration: version tag, store names, classifier fixtures,
/// precache manifest.
pub mod config;

/// Strategy dispatch for intercepted requests.
pub mod dispatch;

/// The engine facade and its event-handler surface.
pub mod engine;

/// Error types for engine operations.
pub mod error;

/// Install / activate lifecycle management.
pub mod lifecycle;

/// Push notification gateway.
pub mod notification;

/// Background task offloading for stale-while-revalidate.
///
/// Serving a cached entry while refreshing it in the background needs
/// detached tasks with their own error handling; [`OffloadManager`]
/// provides them, with per-key deduplication and a cancel timeout.
pub mod offload;

/// The cache registry owning versioned store identities.
pub mod registry;

/// Caching strategies: cache-first, network-first, stale-while-revalidate.
pub mod strategy;

/// The persisted background sync queue.
pub mod sync;

mod classify;

pub use classify::{RequestClass, classify};
pub use config::EngineConfig;
pub use dispatch::Dispatcher;
pub use engine::{Platform, ServiceWorkerEngine, WorkerEvents};
pub use error::EngineError;
pub use lifecycle::{EngineState, LifecycleManager};
pub use notification::{
    Notification, NotificationAction, NotificationGateway, NotificationSink, PushPayload,
};
pub use offload::{OffloadManager, TimeoutPolicy};
pub use registry::CacheRegistry;
pub use strategy::{CacheFirst, NetworkFirst, StaleWhileRevalidate, Strategy};
pub use sync::{SyncQueue, SyncTransport};

/// The `swbox` prelude.
///
/// ```rust
/// use swbox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{EngineConfig, EngineError, Platform, ServiceWorkerEngine, WorkerEvents};
    pub use swbox_core::{FetchRequest, FetchResponse};
}
