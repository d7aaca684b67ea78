//! Strategy dispatch.
//!
//! The dispatcher is the fetch-interception entry point: it decides whether
//! the engine handles a request at all, classifies the ones it does, and
//! delegates to the strategy registered for the class.

use std::sync::Arc;

use swbox_core::{FetchRequest, FetchResponse};
use tracing::trace;

use crate::classify::{RequestClass, classify};
use crate::config::EngineConfig;
use crate::strategy::Strategy;

/// Routes intercepted requests to their strategy.
pub struct Dispatcher {
    config: Arc<EngineConfig>,
    static_assets: Arc<dyn Strategy>,
    api: Arc<dyn Strategy>,
    dynamic: Arc<dyn Strategy>,
}

impl Dispatcher {
    /// Creates a dispatcher with one strategy per request class.
    pub fn new(
        config: Arc<EngineConfig>,
        static_assets: Arc<dyn Strategy>,
        api: Arc<dyn Strategy>,
        dynamic: Arc<dyn Strategy>,
    ) -> Self {
        Dispatcher {
            config,
            static_assets,
            api,
            dynamic,
        }
    }

    /// Handles an intercepted request, or declines it.
    ///
    /// Returns `None` for requests the engine does not handle (anything but
    /// GET); the host lets those proceed to the network untouched. For
    /// handled requests the result is always `Some`: strategies are total.
    pub async fn dispatch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        if !request.is_retrievable() {
            trace!(method = %request.method(), path = request.path(), "declining non-GET request");
            return None;
        }
        let class = classify(&self.config, request);
        trace!(path = request.path(), ?class, "dispatching");
        let strategy = match class {
            RequestClass::StaticAsset => &self.static_assets,
            RequestClass::Api => &self.api,
            RequestClass::Dynamic => &self.dynamic,
        };
        Some(strategy.handle(request).await)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("api_prefix", &self.config.api_prefix)
            .finish_non_exhaustive()
    }
}
