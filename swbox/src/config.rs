//! Engine configuration.
//!
//! [`EngineConfig`] is a plain value object enumerating everything that was
//! implicit in the original deployment: the current version tag, the logical
//! store names, the classifier fixtures and the precache manifest. Passing
//! it into the registry at construction removes the hidden coupling between
//! the lifecycle manager's deletion pass and the strategies' store lookups.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

fn default_version() -> SmolStr {
    SmolStr::new_static("v1")
}

fn default_static_store() -> SmolStr {
    SmolStr::new_static("static")
}

fn default_dynamic_store() -> SmolStr {
    SmolStr::new_static("dynamic")
}

fn default_api_prefix() -> SmolStr {
    SmolStr::new_static("/api/")
}

fn default_static_extensions() -> Vec<SmolStr> {
    ["js", "css", "html", "ico", "png", "jpg", "jpeg", "svg", "gif", "webp", "woff", "woff2", "ttf"]
        .into_iter()
        .map(SmolStr::new_static)
        .collect()
}

fn default_precache_manifest() -> Vec<SmolStr> {
    [
        "/",
        "/index.html",
        "/main.js",
        "/polyfills.js",
        "/styles.css",
        "/favicon.ico",
        "/assets/icons/icon-192x192.png",
        "/assets/icons/icon-512x512.png",
    ]
    .into_iter()
    .map(SmolStr::new_static)
    .collect()
}

fn default_offline_body() -> String {
    "You appear to be offline. This content is unavailable until connectivity returns.".to_owned()
}

fn default_sync_tag() -> SmolStr {
    SmolStr::new_static("background-sync-analytics")
}

fn default_app_url() -> SmolStr {
    SmolStr::new_static("/")
}

fn default_notification_title() -> String {
    "Update".to_owned()
}

fn default_notification_body() -> String {
    "Something new happened in the app.".to_owned()
}

/// Configuration for the whole engine.
///
/// The [`Default`] values reproduce the shipped deployment; serde field
/// defaults let a host override only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Current build's version tag, encoded into every store name.
    #[serde(default = "default_version")]
    pub version: SmolStr,

    /// Logical name of the store holding precached static assets.
    #[serde(default = "default_static_store")]
    pub static_store: SmolStr,

    /// Logical name of the store holding API and dynamic responses.
    #[serde(default = "default_dynamic_store")]
    pub dynamic_store: SmolStr,

    /// Path prefix identifying API requests.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: SmolStr,

    /// File extensions classified as static assets.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<SmolStr>,

    /// Paths that must be cached before install succeeds.
    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<SmolStr>,

    /// Body of the synthetic offline fallback response.
    #[serde(default = "default_offline_body")]
    pub offline_body: String,

    /// Tag of the reconnect signal that triggers a queue drain.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: SmolStr,

    /// URL opened when a notification's "open app" action fires.
    #[serde(default = "default_app_url")]
    pub app_url: SmolStr,

    /// Title for displayed push notifications.
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// Body used when a push payload carries no text.
    #[serde(default = "default_notification_body")]
    pub default_notification_body: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            version: default_version(),
            static_store: default_static_store(),
            dynamic_store: default_dynamic_store(),
            api_prefix: default_api_prefix(),
            static_extensions: default_static_extensions(),
            precache_manifest: default_precache_manifest(),
            offline_body: default_offline_body(),
            sync_tag: default_sync_tag(),
            app_url: default_app_url(),
            notification_title: default_notification_title(),
            default_notification_body: default_notification_body(),
        }
    }
}

impl EngineConfig {
    /// Physical name of a store: the logical name tagged with the version.
    pub fn store_name(&self, logical: &str) -> SmolStr {
        SmolStr::new(format!("{logical}-{}", self.version))
    }

    /// Physical name of the static store for this version.
    pub fn static_store_name(&self) -> SmolStr {
        self.store_name(&self.static_store)
    }

    /// Physical name of the dynamic store for this version.
    pub fn dynamic_store_name(&self) -> SmolStr {
        self.store_name(&self.dynamic_store)
    }

    /// The fixed set of store identities belonging to the current build.
    ///
    /// This is the only set that survives an activate cycle; every other
    /// existing store is deleted.
    pub fn current_store_names(&self) -> Vec<SmolStr> {
        vec![self.static_store_name(), self.dynamic_store_name()]
    }
}
