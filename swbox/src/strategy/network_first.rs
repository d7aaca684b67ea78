//! Network-first strategy.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;
use swbox_core::{CacheKey, FetchRequest, FetchResponse, Fetcher};
use tracing::{debug, instrument, warn};

use crate::registry::CacheRegistry;
use crate::strategy::Strategy;

/// Prefers fresh data, degrading to the last cached snapshot when offline.
///
/// The policy for API reads: the network is always tried first, and every
/// successful response refreshes the cached snapshot. Only when the network
/// itself fails does the strategy reach into the cache; a server-side error
/// response is returned as-is, never masked by stale data.
pub struct NetworkFirst {
    registry: CacheRegistry,
    fetcher: Arc<dyn Fetcher>,
    store: SmolStr,
}

impl NetworkFirst {
    /// Creates the strategy over one logical store.
    pub fn new(registry: CacheRegistry, fetcher: Arc<dyn Fetcher>, store: SmolStr) -> Self {
        NetworkFirst {
            registry,
            fetcher,
            store,
        }
    }
}

#[async_trait]
impl Strategy for NetworkFirst {
    #[instrument(skip_all, fields(path = request.path()))]
    async fn handle(&self, request: &FetchRequest) -> FetchResponse {
        let key = CacheKey::for_request(request);

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if let Some(key) = &key {
                    self.registry.store(&self.store, key, &response).await;
                }
                response
            }
            Err(error) => {
                warn!(%error, path = request.path(), "network failed; falling back to cache");
                if let Some(key) = &key
                    && let Some(entry) = self.registry.lookup(&self.store, key).await
                {
                    debug!(%key, "serving stale snapshot");
                    return entry.into_response();
                }
                FetchResponse::service_unavailable(&self.registry.config().offline_body)
            }
        }
    }
}
