//! Durable cache backends for entity collections.
//!
//! The store only needs `get`/`set`/`clear` by string key, so backends are
//! swappable:
//! - `SqliteStorage` persists across process restarts
//! - `MemoryStorage` lives for the process and is used by tests

mod storage;
mod traits;

pub use storage::{MemoryStorage, SqliteStorage};
pub use traits::KeyValueStore;
