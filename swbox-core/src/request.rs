//! Intercepted request model.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// A fully buffered request intercepted on its way to the network.
///
/// The engine only ever sees complete requests: the host platform buffers
/// the body before handing the request over, so there is no streaming-body
/// machinery here.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchRequest {
    /// Creates a request with the given method and URL and an empty body.
    pub fn new(method: Method, url: Uri) -> Self {
        FetchRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Convenience constructor for a GET request.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not a valid URI. Intended for literals and tests;
    /// platform adapters should build requests from already-parsed parts.
    pub fn get(url: &str) -> Self {
        Self::new(Method::GET, url.parse().expect("valid uri literal"))
    }

    /// Convenience constructor for a POST request with a body.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not a valid URI.
    pub fn post(url: &str, body: Bytes) -> Self {
        let mut request = Self::new(Method::POST, url.parse().expect("valid uri literal"));
        request.body = body;
        request
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URL.
    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// Returns the URL path.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether this request may be served from and written to cache.
    ///
    /// Only GET requests are retrievable; everything else bypasses the
    /// engine entirely.
    pub fn is_retrievable(&self) -> bool {
        self.method == Method::GET
    }
}
