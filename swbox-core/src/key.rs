//! Cache key type.
//!
//! A [`CacheKey`] is the identity of a retrievable request: its method plus
//! its full URL. Only GET requests are retrievable; every other method is
//! passed through to the network untouched and never produces a key, which
//! is what guarantees non-GET traffic is never read from or written to any
//! store.

use std::fmt;

use http::Method;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::request::FetchRequest;

/// Identity of a cached entry: request method plus URL.
///
/// Keys are cheap to clone ([`SmolStr`] stores short URLs inline) and hash
/// by value, so a key built from a duplicate request finds the entry written
/// by the original one.
///
/// # Example
///
/// ```
/// use swbox_core::{CacheKey, FetchRequest};
///
/// let request = FetchRequest::get("/main.js");
/// let key = CacheKey::for_request(&request).unwrap();
/// assert_eq!(format!("{}", key), "GET /main.js");
///
/// let post = FetchRequest::post("/api/data", "{}".into());
/// assert!(CacheKey::for_request(&post).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    #[serde(with = "http_serde::method")]
    method: Method,
    url: SmolStr,
}

impl CacheKey {
    /// Builds the key for a retrievable request.
    ///
    /// Returns `None` for non-GET requests; they have no cache identity.
    pub fn for_request(request: &FetchRequest) -> Option<Self> {
        if !request.is_retrievable() {
            return None;
        }
        Some(CacheKey {
            method: request.method().clone(),
            url: SmolStr::new(request.url().to_string()),
        })
    }

    /// Returns the request method component of the key.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URL component of the key.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
