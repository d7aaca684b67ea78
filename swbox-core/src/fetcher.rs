//! The network seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::request::FetchRequest;
use crate::response::FetchResponse;

/// Error returned when the network itself fails.
///
/// A response with a non-success status is *not* a `FetchError`; the fetch
/// reached a server. `FetchError` covers connectivity loss, DNS failure and
/// the like, the situations the caching strategies degrade around.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network was unreachable or the connection failed.
    #[error(transparent)]
    Connection(Box<dyn std::error::Error + Send + Sync>),

    /// The host platform refused to perform the fetch.
    #[error("fetch rejected by host: {0}")]
    Rejected(String),
}

impl FetchError {
    /// Wraps an arbitrary platform error as a connection failure.
    pub fn connection<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Connection(Box::new(error))
    }
}

/// Trait for performing network fetches.
///
/// Implemented by the host platform's HTTP client binding; the engine never
/// talks to the network directly. Mock implementations make every strategy
/// testable without a wire.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs the request against the network.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}
