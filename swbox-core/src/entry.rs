//! The immutable cached response snapshot.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::response::FetchResponse;

/// An immutable snapshot of `{status, headers, body}` taken at the moment a
/// response was cached.
///
/// Entries carry no TTL or timestamp: staleness is measured implicitly by
/// whether a fresh network response supersedes them, never by age. Writing a
/// new entry for an existing key silently replaces the old one.
///
/// Serialization goes through `http-serde` so platform storage backends can
/// persist entries as plain serde payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    #[serde(with = "http_serde::status_code")]
    status: StatusCode,
    #[serde(with = "http_serde::header_map")]
    headers: HeaderMap,
    body: Bytes,
}

impl CachedEntry {
    /// Returns the snapshot status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the snapshot headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the snapshot body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Reconstructs a servable response from the snapshot.
    pub fn into_response(self) -> FetchResponse {
        FetchResponse::from_parts(self.status, self.headers, self.body)
    }
}

impl From<&FetchResponse> for CachedEntry {
    fn from(response: &FetchResponse) -> Self {
        CachedEntry {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }
}
