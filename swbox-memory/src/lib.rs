#![doc = include_str!("../README.md")]

mod storage;
mod sync;

pub use storage::{MemoryStorage, MemoryStore};
pub use sync::MemorySyncStore;
