//! Caching strategies.
//!
//! A strategy decides the precedence between cache and network for one
//! request and is *total*: it always produces a response, degrading to the
//! synthetic offline fallback when both sources come up empty. Strategies
//! never propagate storage errors into the response path; the registry
//! logs and swallows them.

use async_trait::async_trait;
use swbox_core::{FetchRequest, FetchResponse};

mod cache_first;
mod network_first;
mod stale_while_revalidate;

pub use cache_first::CacheFirst;
pub use network_first::NetworkFirst;
pub use stale_while_revalidate::StaleWhileRevalidate;

/// A cache/network precedence policy for one class of requests.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Produces a response for the request.
    ///
    /// Infallible by contract: the worst case is the offline fallback.
    async fn handle(&self, request: &FetchRequest) -> FetchResponse;
}
