//! Lifecycle control signals to the host platform.

use async_trait::async_trait;

/// Host-side client control issued during install and activate.
///
/// Two signals exist: "become active immediately" (skip waiting for old
/// engine instances to finish) and "take control of open clients" (claim,
/// so they are served by this version without a reload).
#[async_trait]
pub trait ClientControl: Send + Sync {
    /// Signals intent to skip the wait for old instances to be released.
    async fn skip_waiting(&self);

    /// Claims all open client connections for this engine version.
    async fn claim(&self);
}
