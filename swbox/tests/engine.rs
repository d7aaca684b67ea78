//! End-to-end engine tests against in-memory platform fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use swbox::notification::{Notification, NotificationAction, NotificationSink};
use swbox::sync::SyncTransport;
use swbox::{EngineConfig, EngineError, EngineState, Platform, ServiceWorkerEngine, WorkerEvents};
use swbox_core::{
    CacheKey, CacheStorage, ClientControl, FetchError, FetchRequest, FetchResponse, Fetcher,
    SyncItem, SyncStore,
};
use swbox_memory::{MemoryStorage, MemorySyncStore};

/// Programmable upstream: per-path responses, per-path call counts, and a
/// global offline switch.
#[derive(Default)]
struct MockFetcher {
    routes: Mutex<HashMap<String, (StatusCode, String)>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl MockFetcher {
    fn route(&self, path: &str, status: StatusCode, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_owned(), (status, body.to_owned()));
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let path = request.path().to_owned();
        *self.calls.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::connection(std::io::Error::from(
                std::io::ErrorKind::NotConnected,
            )));
        }
        let routes = self.routes.lock().unwrap();
        match routes.get(&path) {
            Some((status, body)) => Ok(FetchResponse::new(
                *status,
                Bytes::copy_from_slice(body.as_bytes()),
            )),
            None => Ok(FetchResponse::new(
                StatusCode::NOT_FOUND,
                Bytes::from_static(b"not found"),
            )),
        }
    }
}

#[derive(Default)]
struct MockClients {
    skip_waiting_calls: AtomicUsize,
    claim_calls: AtomicUsize,
}

#[async_trait]
impl ClientControl for MockClients {
    async fn skip_waiting(&self) {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn claim(&self) {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Delivers every payload except an optional one-shot failure.
#[derive(Default)]
struct MockTransport {
    delivered: Mutex<Vec<Bytes>>,
    fail_once: Mutex<Option<Bytes>>,
}

impl MockTransport {
    fn fail_once_on(&self, payload: &'static [u8]) {
        *self.fail_once.lock().unwrap() = Some(Bytes::from_static(payload));
    }

    fn delivered(&self) -> Vec<Bytes> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn deliver(&self, item: &SyncItem) -> Result<(), FetchError> {
        let mut fail_once = self.fail_once.lock().unwrap();
        if fail_once.as_ref() == Some(&item.payload) {
            *fail_once = None;
            return Err(FetchError::Rejected("ingest unavailable".to_owned()));
        }
        drop(fail_once);
        self.delivered.lock().unwrap().push(item.payload.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    shown: Mutex<Vec<Notification>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn show(&self, notification: Notification) {
        self.shown.lock().unwrap().push(notification);
    }

    async fn open_window(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_owned());
    }
}

struct Harness {
    engine: ServiceWorkerEngine,
    fetcher: Arc<MockFetcher>,
    storage: Arc<MemoryStorage>,
    clients: Arc<MockClients>,
    sync_store: Arc<MemorySyncStore>,
    transport: Arc<MockTransport>,
    sink: Arc<RecordingSink>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    fn with_config(config: EngineConfig) -> Self {
        let fetcher = Arc::new(MockFetcher::default());
        let storage = Arc::new(MemoryStorage::new());
        let clients = Arc::new(MockClients::default());
        let sync_store = Arc::new(MemorySyncStore::new());
        let transport = Arc::new(MockTransport::default());
        let sink = Arc::new(RecordingSink::default());

        let engine = ServiceWorkerEngine::new(
            config,
            Platform {
                storage: storage.clone(),
                fetcher: fetcher.clone(),
                clients: clients.clone(),
                sync_store: sync_store.clone(),
                sync_transport: transport.clone(),
                notifications: sink.clone(),
            },
        );

        Harness {
            engine,
            fetcher,
            storage,
            clients,
            sync_store,
            transport,
            sink,
        }
    }

    /// Registers a 200 route for every default manifest path.
    fn route_manifest(&self) {
        for path in &EngineConfig::default().precache_manifest {
            self.fetcher.route(path, StatusCode::OK, "asset");
        }
    }

    async fn cached_body(&self, store: &str, path: &str) -> Option<Bytes> {
        let store = self.storage.open(store).await.unwrap();
        let key = CacheKey::for_request(&FetchRequest::get(path)).unwrap();
        store
            .read(&key)
            .await
            .unwrap()
            .map(|entry| entry.body().clone())
    }
}

// --- lifecycle ---

#[tokio::test]
async fn install_precaches_whole_manifest() {
    let harness = Harness::new();
    harness.route_manifest();

    harness.engine.on_install().await.unwrap();

    assert_eq!(harness.engine.state().await, EngineState::Installed);
    assert_eq!(harness.clients.skip_waiting_calls.load(Ordering::SeqCst), 1);
    for path in &EngineConfig::default().precache_manifest {
        assert_eq!(harness.fetcher.calls(path), 1, "{path} fetched once");
        assert!(
            harness.cached_body("static-v1", path).await.is_some(),
            "{path} precached"
        );
    }
}

#[tokio::test]
async fn install_is_idempotent() {
    let harness = Harness::new();
    harness.route_manifest();

    harness.engine.on_install().await.unwrap();
    harness.engine.on_install().await.unwrap();

    assert_eq!(harness.engine.state().await, EngineState::Installed);
    assert_eq!(harness.fetcher.calls("/main.js"), 2);
    assert!(harness.cached_body("static-v1", "/main.js").await.is_some());
}

#[tokio::test]
async fn failed_precache_writes_nothing() {
    let harness = Harness::new();
    harness.route_manifest();
    // One manifest asset is broken upstream.
    harness.fetcher.route("/main.js", StatusCode::INTERNAL_SERVER_ERROR, "boom");

    let error = harness.engine.on_install().await.unwrap_err();
    assert!(matches!(error, EngineError::Precache { ref path, .. } if path == "/main.js"));
    assert_eq!(harness.engine.state().await, EngineState::Redundant);
    assert_eq!(harness.clients.skip_waiting_calls.load(Ordering::SeqCst), 0);

    // Atomicity: not even the assets that fetched fine were written.
    for path in &EngineConfig::default().precache_manifest {
        assert!(harness.cached_body("static-v1", path).await.is_none());
    }
}

#[tokio::test]
async fn activate_deletes_prior_version_stores() {
    let harness = Harness::new();
    harness.storage.open("static-v0").await.unwrap();
    harness.storage.open("dynamic-v0").await.unwrap();
    harness.storage.open("static-v1").await.unwrap();

    harness.engine.on_activate().await.unwrap();

    assert_eq!(harness.engine.state().await, EngineState::Active);
    assert_eq!(harness.clients.claim_calls.load(Ordering::SeqCst), 1);
    let remaining = harness.storage.list().await.unwrap();
    assert_eq!(remaining, vec![smol_str::SmolStr::new("static-v1")]);
}

// --- cache-first (static assets) ---

#[tokio::test]
async fn precached_asset_is_served_without_network() {
    let harness = Harness::new();
    harness.route_manifest();
    harness.engine.on_install().await.unwrap();
    harness.fetcher.set_offline(true);

    let response = harness
        .engine
        .on_fetch(&FetchRequest::get("/main.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"asset");
    assert_eq!(harness.fetcher.calls("/main.js"), 1); // install only
}

#[tokio::test]
async fn static_miss_fetches_once_then_serves_from_cache() {
    let harness = Harness::new();
    harness.fetcher.route("/vendor.js", StatusCode::OK, "vendor");

    for _ in 0..3 {
        let response = harness
            .engine
            .on_fetch(&FetchRequest::get("/vendor.js"))
            .await
            .unwrap();
        assert_eq!(response.body().as_ref(), b"vendor");
    }
    assert_eq!(harness.fetcher.calls("/vendor.js"), 1);
}

#[tokio::test]
async fn static_miss_while_offline_degrades_to_fallback() {
    let harness = Harness::new();
    harness.fetcher.set_offline(true);

    let response = harness
        .engine
        .on_fetch(&FetchRequest::get("/vendor.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.body().as_ref(),
        EngineConfig::default().offline_body.as_bytes()
    );
}

// --- network-first (API) ---

#[tokio::test]
async fn api_prefers_network_and_falls_back_to_snapshot() {
    let harness = Harness::new();
    harness.fetcher.route("/api/data", StatusCode::OK, "fresh");

    let online = harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();
    assert_eq!(online.body().as_ref(), b"fresh");

    harness.fetcher.set_offline(true);
    let offline = harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();
    assert_eq!(offline.body().as_ref(), b"fresh");
    // The network was attempted both times.
    assert_eq!(harness.fetcher.calls("/api/data"), 2);
}

#[tokio::test]
async fn api_server_error_is_returned_not_masked_by_cache() {
    let harness = Harness::new();
    harness.fetcher.route("/api/data", StatusCode::OK, "good");
    harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();

    harness
        .fetcher
        .route("/api/data", StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let response = harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body().as_ref(), b"boom");

    // The error response was not cached over the good snapshot.
    harness.fetcher.set_offline(true);
    let snapshot = harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();
    assert_eq!(snapshot.body().as_ref(), b"good");
}

#[tokio::test]
async fn api_offline_with_no_snapshot_is_fallback() {
    let harness = Harness::new();
    harness.fetcher.set_offline(true);

    let response = harness
        .engine
        .on_fetch(&FetchRequest::get("/api/data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// --- stale-while-revalidate (dynamic pages) ---

#[tokio::test]
async fn dynamic_hit_serves_stale_and_refreshes_in_background() {
    let harness = Harness::new();
    harness.fetcher.route("/dashboard", StatusCode::OK, "v1");

    // Miss: fetched in the foreground and cached.
    let first = harness
        .engine
        .on_fetch(&FetchRequest::get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(first.body().as_ref(), b"v1");

    // Content changes upstream; the hit still serves the stale snapshot.
    harness.fetcher.route("/dashboard", StatusCode::OK, "v2");
    let stale = harness
        .engine
        .on_fetch(&FetchRequest::get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(stale.body().as_ref(), b"v1");

    // After the background revalidation lands, the next hit is fresh.
    harness.engine.offload().wait_idle().await;
    assert_eq!(
        harness.cached_body("dynamic-v1", "/dashboard").await.unwrap().as_ref(),
        b"v2"
    );
    let fresh = harness
        .engine
        .on_fetch(&FetchRequest::get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(fresh.body().as_ref(), b"v2");
}

#[tokio::test]
async fn dynamic_hit_while_offline_keeps_stale_snapshot() {
    let harness = Harness::new();
    harness.fetcher.route("/dashboard", StatusCode::OK, "v1");
    harness
        .engine
        .on_fetch(&FetchRequest::get("/dashboard"))
        .await
        .unwrap();

    harness.fetcher.set_offline(true);
    let stale = harness
        .engine
        .on_fetch(&FetchRequest::get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(stale.body().as_ref(), b"v1");

    // The failed revalidation must not evict the snapshot.
    harness.engine.offload().wait_idle().await;
    assert_eq!(
        harness.cached_body("dynamic-v1", "/dashboard").await.unwrap().as_ref(),
        b"v1"
    );
}

// --- dispatch ---

#[tokio::test]
async fn non_get_requests_are_declined_untouched() {
    let harness = Harness::new();
    let request = FetchRequest::post("/api/data", Bytes::from_static(b"{}"));

    assert!(harness.engine.on_fetch(&request).await.is_none());
    assert_eq!(harness.fetcher.calls("/api/data"), 0);
}

#[tokio::test]
async fn head_requests_are_declined() {
    let harness = Harness::new();
    let request = FetchRequest::new(Method::HEAD, "/main.js".parse().unwrap());
    assert!(harness.engine.on_fetch(&request).await.is_none());
}

// --- storage degradation ---

struct BrokenStore;

#[async_trait]
impl swbox_core::CacheStore for BrokenStore {
    async fn read(&self, _: &CacheKey) -> swbox_core::StorageResult<Option<swbox_core::CachedEntry>> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }

    async fn write(
        &self,
        _: &CacheKey,
        _: swbox_core::CachedEntry,
    ) -> swbox_core::StorageResult<()> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }

    async fn remove(&self, _: &CacheKey) -> swbox_core::StorageResult<swbox_core::DeleteStatus> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }

    async fn keys(&self) -> swbox_core::StorageResult<Vec<CacheKey>> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }
}

struct BrokenStorage;

#[async_trait]
impl CacheStorage for BrokenStorage {
    async fn open(&self, _: &str) -> swbox_core::StorageResult<Arc<dyn swbox_core::CacheStore>> {
        Ok(Arc::new(BrokenStore))
    }

    async fn delete(&self, _: &str) -> swbox_core::StorageResult<swbox_core::DeleteStatus> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }

    async fn list(&self) -> swbox_core::StorageResult<Vec<smol_str::SmolStr>> {
        Err(swbox_core::StorageError::Denied("quota exceeded".to_owned()))
    }
}

#[tokio::test]
async fn broken_storage_never_fails_a_response() {
    let fetcher = Arc::new(MockFetcher::default());
    fetcher.route("/main.js", StatusCode::OK, "asset");
    fetcher.route("/api/data", StatusCode::OK, "fresh");

    let engine = ServiceWorkerEngine::new(
        EngineConfig::default(),
        Platform {
            storage: Arc::new(BrokenStorage),
            fetcher: fetcher.clone(),
            clients: Arc::new(MockClients::default()),
            sync_store: Arc::new(MemorySyncStore::new()),
            sync_transport: Arc::new(MockTransport::default()),
            notifications: Arc::new(RecordingSink::default()),
        },
    );

    for path in ["/main.js", "/api/data", "/dashboard"] {
        let response = engine.on_fetch(&FetchRequest::get(path)).await.unwrap();
        assert_ne!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{path} degraded gracefully"
        );
    }
}

// --- background sync ---

#[tokio::test]
async fn sync_drains_fifo_and_clears_queue() {
    let harness = Harness::new();
    for payload in [b"one".as_slice(), b"two", b"three"] {
        harness
            .engine
            .enqueue_sync(Bytes::copy_from_slice(payload))
            .await
            .unwrap();
    }

    let delivered = harness
        .engine
        .on_sync("background-sync-analytics")
        .await
        .unwrap();

    assert_eq!(delivered, 3);
    assert_eq!(
        harness.transport.delivered(),
        vec![
            Bytes::from_static(b"one"),
            Bytes::from_static(b"two"),
            Bytes::from_static(b"three")
        ]
    );
    assert!(harness.sync_store.peek_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_delivery_stops_the_drain_and_keeps_order() {
    let harness = Harness::new();
    for payload in [b"one".as_slice(), b"two", b"three"] {
        harness
            .engine
            .enqueue_sync(Bytes::copy_from_slice(payload))
            .await
            .unwrap();
    }
    harness.transport.fail_once_on(b"two");

    let first_pass = harness
        .engine
        .on_sync("background-sync-analytics")
        .await
        .unwrap();
    assert_eq!(first_pass, 1);

    let pending = harness.sync_store.peek_all().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].payload.as_ref(), b"two");
    assert_eq!(pending[0].attempts, 1);
    assert_eq!(pending[1].payload.as_ref(), b"three");

    // The next reconnect signal finishes the job.
    let second_pass = harness
        .engine
        .on_sync("background-sync-analytics")
        .await
        .unwrap();
    assert_eq!(second_pass, 2);
    assert!(harness.sync_store.peek_all().await.unwrap().is_empty());
}

/// Parks every delivery until released, to hold a drain open.
struct GatedTransport {
    gate: tokio::sync::Notify,
    delivered: AtomicUsize,
}

#[async_trait]
impl SyncTransport for GatedTransport {
    async fn deliver(&self, _: &SyncItem) -> Result<(), FetchError> {
        self.gate.notified().await;
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn concurrent_reconnect_signals_coalesce() {
    let transport = Arc::new(GatedTransport {
        gate: tokio::sync::Notify::new(),
        delivered: AtomicUsize::new(0),
    });
    let sync_store = Arc::new(MemorySyncStore::new());
    let engine = ServiceWorkerEngine::new(
        EngineConfig::default(),
        Platform {
            storage: Arc::new(MemoryStorage::new()),
            fetcher: Arc::new(MockFetcher::default()),
            clients: Arc::new(MockClients::default()),
            sync_store: sync_store.clone(),
            sync_transport: transport.clone(),
            notifications: Arc::new(RecordingSink::default()),
        },
    );
    engine.enqueue_sync(Bytes::from_static(b"one")).await.unwrap();

    let release = async {
        // Give the first drain a chance to park inside the transport, then
        // fire a second reconnect signal and release the gate.
        tokio::task::yield_now().await;
        let coalesced = engine.on_sync("background-sync-analytics").await.unwrap();
        assert_eq!(coalesced, 0, "second signal coalesces into the running drain");
        transport.gate.notify_one();
    };
    let (first, ()) = tokio::join!(engine.on_sync("background-sync-analytics"), release);

    assert_eq!(first.unwrap(), 1);
    assert_eq!(transport.delivered.load(Ordering::SeqCst), 1);
    assert!(sync_store.peek_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_sync_tag_is_ignored() {
    let harness = Harness::new();
    harness
        .engine
        .enqueue_sync(Bytes::from_static(b"one"))
        .await
        .unwrap();

    let delivered = harness.engine.on_sync("periodic-refresh").await.unwrap();

    assert_eq!(delivered, 0);
    assert!(harness.transport.delivered().is_empty());
    assert_eq!(harness.sync_store.peek_all().await.unwrap().len(), 1);
}

// --- notifications ---

#[tokio::test]
async fn push_with_text_shows_it() {
    let harness = Harness::new();
    harness.engine.on_push(br#"{"text": "report ready"}"#).await;

    let shown = harness.sink.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Update");
    assert_eq!(shown[0].body, "report ready");
    assert_eq!(
        shown[0].actions,
        vec![NotificationAction::Open, NotificationAction::Dismiss]
    );
}

#[tokio::test]
async fn empty_push_uses_default_body() {
    let harness = Harness::new();
    harness.engine.on_push(b"").await;

    let shown = harness.sink.shown();
    assert_eq!(shown[0].body, EngineConfig::default().default_notification_body);
}

#[tokio::test]
async fn open_action_opens_the_app_window() {
    let harness = Harness::new();
    harness
        .engine
        .on_notification_click(NotificationAction::Open)
        .await;
    harness
        .engine
        .on_notification_click(NotificationAction::Dismiss)
        .await;

    assert_eq!(harness.sink.opened(), vec!["/".to_owned()]);
}

// --- configuration ---

#[tokio::test]
async fn version_bump_changes_store_identities() {
    let mut config = EngineConfig::default();
    config.version = "v2".into();
    config.precache_manifest = vec!["/main.js".into()];
    let harness = Harness::with_config(config);
    harness.fetcher.route("/main.js", StatusCode::OK, "asset");

    harness.engine.on_install().await.unwrap();

    assert!(harness.cached_body("static-v2", "/main.js").await.is_some());
    assert!(harness.cached_body("static-v1", "/main.js").await.is_none());
}
