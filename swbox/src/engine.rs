//! The engine facade.
//!
//! [`ServiceWorkerEngine`] wires the registry, strategies, lifecycle, sync
//! queue and notification gateway together from one [`Platform`] of injected
//! seams, and exposes the result as [`WorkerEvents`]: one method per event
//! the host delivers. Nothing here touches ambient globals; every effect
//! flows through a trait object handed in at construction.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use swbox_core::{
    CacheStorage, ClientControl, FetchRequest, FetchResponse, Fetcher, SyncStore,
};
use tracing::debug;

use crate::config::EngineConfig;
use crate::dispatch::Dispatcher;
use crate::error::EngineError;
use crate::lifecycle::{EngineState, LifecycleManager};
use crate::notification::{NotificationAction, NotificationGateway, NotificationSink};
use crate::offload::{OffloadManager, TimeoutPolicy};
use crate::registry::CacheRegistry;
use crate::strategy::{CacheFirst, NetworkFirst, StaleWhileRevalidate};
use crate::sync::{SyncQueue, SyncTransport};

/// The host platform's capabilities, as injected seams.
///
/// A real embedding binds these to its cache storage, HTTP client, client
/// controller, persistence and notification APIs; tests bind them to the
/// in-memory fakes.
#[derive(Clone)]
pub struct Platform {
    /// Persistent named cache stores.
    pub storage: Arc<dyn CacheStorage>,
    /// The network.
    pub fetcher: Arc<dyn Fetcher>,
    /// Control over the pages this engine serves.
    pub clients: Arc<dyn ClientControl>,
    /// Persistence for the background sync queue.
    pub sync_store: Arc<dyn SyncStore>,
    /// Delivery of queued sync payloads.
    pub sync_transport: Arc<dyn SyncTransport>,
    /// Notification display and window control.
    pub notifications: Arc<dyn NotificationSink>,
}

/// One event-handler method per event the host delivers.
///
/// The engine implements this; a host binding forwards its platform's
/// lifecycle, fetch, sync, push and click events to these methods.
#[async_trait]
pub trait WorkerEvents: Send + Sync {
    /// The host is installing this version.
    async fn on_install(&self) -> Result<(), EngineError>;

    /// The host is activating this version.
    async fn on_activate(&self) -> Result<(), EngineError>;

    /// The host intercepted an outgoing request.
    ///
    /// `None` means the engine declines and the request should proceed to
    /// the network untouched.
    async fn on_fetch(&self, request: &FetchRequest) -> Option<FetchResponse>;

    /// Connectivity returned; a registered sync tag fired.
    ///
    /// Returns how many queued items were delivered. Tags other than the
    /// configured one are ignored.
    async fn on_sync(&self, tag: &str) -> Result<usize, EngineError>;

    /// A push message arrived.
    async fn on_push(&self, payload: &[u8]);

    /// The user clicked a notification action.
    async fn on_notification_click(&self, action: NotificationAction);
}

/// The assembled offline caching and synchronization engine.
pub struct ServiceWorkerEngine {
    config: Arc<EngineConfig>,
    lifecycle: LifecycleManager,
    dispatcher: Dispatcher,
    sync_queue: SyncQueue,
    notifications: NotificationGateway,
    offload: OffloadManager,
}

impl ServiceWorkerEngine {
    /// Assembles an engine with the default background-task timeout policy.
    pub fn new(config: EngineConfig, platform: Platform) -> Self {
        Self::with_timeout_policy(config, platform, TimeoutPolicy::default())
    }

    /// Assembles an engine with an explicit background-task timeout policy.
    pub fn with_timeout_policy(
        config: EngineConfig,
        platform: Platform,
        policy: TimeoutPolicy,
    ) -> Self {
        let config = Arc::new(config);
        let registry = CacheRegistry::new(Arc::clone(&platform.storage), Arc::clone(&config));
        let offload = OffloadManager::new(policy);

        let static_assets = Arc::new(CacheFirst::new(
            registry.clone(),
            Arc::clone(&platform.fetcher),
            config.static_store.clone(),
        ));
        let api = Arc::new(NetworkFirst::new(
            registry.clone(),
            Arc::clone(&platform.fetcher),
            config.dynamic_store.clone(),
        ));
        let dynamic = Arc::new(StaleWhileRevalidate::new(
            registry.clone(),
            Arc::clone(&platform.fetcher),
            offload.clone(),
            config.dynamic_store.clone(),
        ));

        ServiceWorkerEngine {
            dispatcher: Dispatcher::new(Arc::clone(&config), static_assets, api, dynamic),
            lifecycle: LifecycleManager::new(
                registry,
                Arc::clone(&platform.fetcher),
                Arc::clone(&platform.clients),
            ),
            sync_queue: SyncQueue::new(
                Arc::clone(&platform.sync_store),
                Arc::clone(&platform.sync_transport),
            ),
            notifications: NotificationGateway::new(
                Arc::clone(&config),
                Arc::clone(&platform.notifications),
            ),
            offload,
            config,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The engine's lifecycle state.
    pub async fn state(&self) -> EngineState {
        self.lifecycle.state().await
    }

    /// Defers a payload for delivery on the next reconnect signal.
    ///
    /// This is how application code hands the engine work that failed to
    /// reach the server while offline.
    pub async fn enqueue_sync(&self, payload: Bytes) -> Result<(), EngineError> {
        self.sync_queue.enqueue(payload).await
    }

    /// The background sync queue.
    pub fn sync_queue(&self) -> &SyncQueue {
        &self.sync_queue
    }

    /// The background task manager.
    ///
    /// Exposed so embedders (and tests) can wait for in-flight
    /// revalidations before shutdown.
    pub fn offload(&self) -> &OffloadManager {
        &self.offload
    }
}

#[async_trait]
impl WorkerEvents for ServiceWorkerEngine {
    async fn on_install(&self) -> Result<(), EngineError> {
        self.lifecycle.install().await
    }

    async fn on_activate(&self) -> Result<(), EngineError> {
        self.lifecycle.activate().await
    }

    async fn on_fetch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        self.dispatcher.dispatch(request).await
    }

    async fn on_sync(&self, tag: &str) -> Result<usize, EngineError> {
        if tag != self.config.sync_tag {
            debug!(tag, expected = %self.config.sync_tag, "ignoring unknown sync tag");
            return Ok(0);
        }
        self.sync_queue.drain().await
    }

    async fn on_push(&self, payload: &[u8]) {
        self.notifications.on_push(payload).await;
    }

    async fn on_notification_click(&self, action: NotificationAction) {
        self.notifications.on_click(action).await;
    }
}

impl std::fmt::Debug for ServiceWorkerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorkerEngine")
            .field("version", &self.config.version)
            .finish_non_exhaustive()
    }
}
