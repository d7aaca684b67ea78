//! Cache-first strategy.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;
use swbox_core::{CacheKey, FetchRequest, FetchResponse, Fetcher};
use tracing::{debug, instrument};

use crate::registry::CacheRegistry;
use crate::strategy::Strategy;

/// Serves from cache when possible, touching the network only on a miss.
///
/// The policy for immutable build artifacts: once an asset is cached its
/// bytes never change for the lifetime of the version, so a hit skips the
/// network entirely. A miss fetches, caches the response if it succeeded
/// and returns it either way.
pub struct CacheFirst {
    registry: CacheRegistry,
    fetcher: Arc<dyn Fetcher>,
    store: SmolStr,
}

impl CacheFirst {
    /// Creates the strategy over one logical store.
    pub fn new(registry: CacheRegistry, fetcher: Arc<dyn Fetcher>, store: SmolStr) -> Self {
        CacheFirst {
            registry,
            fetcher,
            store,
        }
    }

    async fn network_only(&self, request: &FetchRequest) -> FetchResponse {
        match self.fetcher.fetch(request).await {
            Ok(response) => response,
            Err(_) => FetchResponse::service_unavailable(&self.registry.config().offline_body),
        }
    }
}

#[async_trait]
impl Strategy for CacheFirst {
    #[instrument(skip_all, fields(path = request.path()))]
    async fn handle(&self, request: &FetchRequest) -> FetchResponse {
        let Some(key) = CacheKey::for_request(request) else {
            // Non-retrievable requests pass straight through.
            return self.network_only(request).await;
        };

        if let Some(entry) = self.registry.lookup(&self.store, &key).await {
            debug!(%key, "cache hit");
            return entry.into_response();
        }

        debug!(%key, "cache miss; fetching");
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
