//! Request classification.

use swbox_core::FetchRequest;

use crate::config::EngineConfig;

/// The class an intercepted request belongs to, determining which strategy
/// handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// A build-time asset (script, stylesheet, image, font).
    StaticAsset,
    /// A request against the API prefix.
    Api,
    /// Everything else.
    Dynamic,
}

/// Classifies a request from its URL path.
///
/// Pure and deterministic: identical input always yields the same class,
/// which is what makes the dispatcher's routing testable in isolation.
/// The extension check runs before the prefix check, so an API path that
/// ends in a static extension routes as a static asset.
pub fn classify(config: &EngineConfig, request: &FetchRequest) -> RequestClass {
    let path = request.path();
    if let Some(extension) = extension(path)
        && config.static_extensions.iter().any(|e| e == extension)
    {
        return RequestClass::StaticAsset;
    }
    if path.starts_with(config.api_prefix.as_str()) {
        return RequestClass::Api;
    }
    RequestClass::Dynamic
}

/// Extension of the last path segment, if it has one.
///
/// A leading dot is not an extension separator: `/.well-known` has none.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = segment.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension)
}
