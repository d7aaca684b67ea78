//! Stale-while-revalidate strategy.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;
use swbox_core::{CacheKey, FetchRequest, FetchResponse, Fetcher, Offload};
use tracing::{debug, instrument};

use crate::registry::CacheRegistry;
use crate::strategy::Strategy;

/// Serves the cached snapshot immediately and refreshes it in the background.
///
/// The policy for dynamic pages: latency of a cache hit, freshness on the
/// *next* visit. A hit answers from cache and offloads a revalidation fetch;
/// revalidations for the same key are deduplicated while one is in flight.
/// A miss behaves like cache-first: fetch, cache on success, offline
/// fallback on network failure.
pub struct StaleWhileRevalidate<O: Offload> {
    registry: CacheRegistry,
    fetcher: Arc<dyn Fetcher>,
    offload: O,
    store: SmolStr,
}

impl<O: Offload + 'static> StaleWhileRevalidate<O> {
    /// Creates the strategy over one logical store.
    pub fn new(
        registry: CacheRegistry,
        fetcher: Arc<dyn Fetcher>,
        offload: O,
        store: SmolStr,
    ) -> Self {
        StaleWhileRevalidate {
            registry,
            fetcher,
            offload,
            store,
        }
    }

    fn spawn_revalidation(&self, key: CacheKey, request: FetchRequest) {
        let registry = self.registry.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let store = self.store.clone();
        let task_key = key.clone();

        self.offload.spawn_keyed("revalidate", key, async move {
            match fetcher.fetch(&request).await {
                Ok(response) => {
                    // store() refuses non-success responses, so a failed
                    // revalidation never clobbers a good snapshot.
                    registry.store(&store, &task_key, &response).await;
                }
                Err(error) => {
                    debug!(key = %task_key, %error, "revalidation fetch failed; keeping stale entry");
                }
            }
        });
    }
}

#[async_trait]
impl<O: Offload + 'static> Strategy for StaleWhileRevalidate<O> {
    #[instrument(skip_all, fields(path = request.path()))]
    async fn handle(&self, request: &FetchRequest) -> FetchResponse {
        let Some(key) = CacheKey::for_request(request) else {
            return match self.fetcher.fetch(request).await {
                Ok(response) => response,
                Err(_) => {
                    FetchResponse::service_unavailable(&self.registry.config().offline_body)
                }
            };
        };

        if let Some(entry) = self.registry.lookup(&self.store, &key).await {
            debug!(%key, "cache hit; revalidating in background");
            self.spawn_revalidation(key, request.clone());
            return entry.into_response();
        }

        debug!(%key, "cache miss; fetching in foreground");
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.registry.store(&self.store, &key, &response).await;
                response
            }
            Err(error) => {
                debug!(%key, %error, "network failed on cache miss");
                FetchResponse::service_unavailable(&self.registry.config().offline_body)
            }
        }
    }
}
