//! Install / activate lifecycle.
//!
//! A new engine version installs by precaching its manifest into the
//! current-version static store, then activates by deleting every store
//! belonging to a previous version and claiming the open clients. Install is
//! atomic with respect to the manifest: responses are fetched first and
//! written only once all of them arrived, so a single unreachable asset
//! leaves the store untouched and the previous version keeps serving.

use std::sync::Arc;

use futures::future::try_join_all;
use http::{Method, Uri};
use smol_str::SmolStr;
use swbox_core::{CacheKey, CachedEntry, ClientControl, FetchRequest, FetchResponse, Fetcher};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::error::EngineError;
use crate::registry::CacheRegistry;

/// The engine's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; no lifecycle event handled yet.
    Idle,
    /// Install in progress.
    Installing,
    /// Precache complete; waiting for activation.
    Installed,
    /// Activation in progress.
    Activating,
    /// Serving requests.
    Active,
    /// A lifecycle transition failed; this instance will not serve.
    Redundant,
}

/// Drives the install and activate transitions.
pub struct LifecycleManager {
    registry: CacheRegistry,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn ClientControl>,
    state: RwLock<EngineState>,
}

impl LifecycleManager {
    /// Creates a manager in the [`EngineState::Idle`] state.
    pub fn new(
        registry: CacheRegistry,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn ClientControl>,
    ) -> Self {
        LifecycleManager {
            registry,
            fetcher,
            clients,
            state: RwLock::new(EngineState::Idle),
        }
    }

    /// The current lifecycle state.
    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    /// Installs this version: precaches the manifest and requests immediate
    /// takeover.
    ///
    /// All manifest assets are fetched concurrently; any fetch failure or
    /// non-success status fails the install before a single write happens.
    /// Re-running a successful install refetches and rewrites the same
    /// entries, so the operation is idempotent.
    #[instrument(skip(self), fields(version = %self.registry.config().version))]
    pub async fn install(&self) -> Result<(), EngineError> {
        *self.state.write().await = EngineState::Installing;

        let result = self.precache().await;
        if let Err(error) = result {
            warn!(%error, "install failed");
            *self.state.write().await = EngineState::Redundant;
            return Err(error);
        }

        *self.state.write().await = EngineState::Installed;
        info!(
            assets = self.registry.config().precache_manifest.len(),
            "install complete; requesting immediate takeover"
        );
        self.clients.skip_waiting().await;
        Ok(())
    }

    /// Activates this version: garbage-collects prior-version stores and
    /// claims the open clients.
    #[instrument(skip(self), fields(version = %self.registry.config().version))]
    pub async fn activate(&self) -> Result<(), EngineError> {
        *self.state.write().await = EngineState::Activating;

        let current = self.registry.config().current_store_names();
        match self.registry.delete_stores_not_in(&current).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "deleted stores from previous versions");
                }
            }
            Err(error) => {
                warn!(%error, "activation failed while deleting old stores");
                *self.state.write().await = EngineState::Redundant;
                return Err(error.into());
            }
        }

        self.clients.claim().await;
        *self.state.write().await = EngineState::Active;
        info!("activation complete");
        Ok(())
    }

    /// Fetches every manifest asset, then writes them all.
    async fn precache(&self) -> Result<(), EngineError> {
        let manifest = &self.registry.config().precache_manifest;
        let fetches = manifest.iter().map(|path| self.fetch_asset(path));
        let entries = try_join_all(fetches).await?;

        // Writes go through the store directly: a failed write must fail the
        // install, unlike the registry's best-effort runtime writes.
        let store = self
            .registry
            .open(&self.registry.config().static_store)
            .await?;
        for (key, entry) in entries {
            store.write(&key, entry).await?;
        }
        Ok(())
    }

    async fn fetch_asset(&self, path: &SmolStr) -> Result<(CacheKey, CachedEntry), EngineError> {
        let precache_failure = |reason: String| EngineError::Precache {
            path: path.clone(),
            reason,
        };

        let url = Uri::try_from(path.as_str())
            .map_err(|error| precache_failure(format!("invalid manifest path: {error}")))?;
        let request = FetchRequest::new(Method::GET, url);
        let key = CacheKey::for_request(&request)
            .ok_or_else(|| precache_failure("manifest path produced no cache key".to_owned()))?;

        let response: FetchResponse = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|error| precache_failure(error.to_string()))?;
        if !response.is_success() {
            return Err(precache_failure(format!(
                "asset responded with status {}",
                response.status()
            )));
        }
        Ok((key, CachedEntry::from(&response)))
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
