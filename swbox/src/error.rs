//! Error types for engine operations.

use smol_str::SmolStr;
use swbox_core::{FetchError, StorageError};
use thiserror::Error;

/// Error type for engine operations.
///
/// Most runtime failures never surface here: strategies degrade to cache or
/// the offline fallback, and cache write failures are logged and swallowed.
/// `EngineError` covers the operations that are allowed to fail loudly:
/// lifecycle transitions and explicit queue access.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A network fetch failed in a context with no fallback.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Precaching a manifest asset failed, failing the install as a whole.
    #[error("precache of {path} failed: {reason}")]
    Precache {
        /// The manifest path that could not be fetched or stored.
        path: SmolStr,
        /// Why it failed.
        reason: String,
    },
}
