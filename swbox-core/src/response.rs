//! Response model and the synthetic offline fallback.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};

/// A fully buffered response, either from the network or reconstructed from
/// a cached entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        FetchResponse {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Creates a response from all of its parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        FetchResponse {
            status,
            headers,
            body,
        }
    }

    /// The synthetic offline fallback: HTTP 503 with a human-readable
    /// plain-text message.
    ///
    /// This is the last-resort response every strategy returns when both
    /// network and cache come up empty, so an intercepted request never
    /// fails with an unhandled error.
    pub fn service_unavailable(message: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        FetchResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::copy_from_slice(message.as_bytes()),
        }
    }

    /// Returns the response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the status indicates success (2xx).
    ///
    /// Only successful responses are ever written to a cache store.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_fallback_is_service_unavailable() {
        let response = FetchResponse::service_unavailable("You appear to be offline.");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!response.is_success());
        assert_eq!(response.body().as_ref(), b"You appear to be offline.");
    }
}
