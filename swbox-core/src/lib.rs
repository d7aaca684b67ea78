#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod clients;
pub mod entry;
pub mod fetcher;
pub mod key;
pub mod offload;
pub mod request;
pub mod response;
pub mod storage;
pub mod sync;

pub use clients::ClientControl;
pub use entry::CachedEntry;
pub use fetcher::{FetchError, Fetcher};
pub use key::CacheKey;
pub use offload::Offload;
pub use request::FetchRequest;
pub use response::FetchResponse;
pub use storage::{CacheStore, CacheStorage, DeleteStatus, StorageError, StorageResult};
pub use sync::{SyncItem, SyncStore};
