//! Offline snapshot cache for published content.
//!
//! This module provides:
//! - A synchronous key-value storage seam with SQLite and in-memory backends
//! - A single time-boxed snapshot of the article list, keyed per service origin
//! - Cache-miss semantics for anything absent, corrupt or past its TTL

mod clock;
mod snapshot;
mod storage;

#[cfg(test)]
pub use clock::Clock;
pub use snapshot::{CacheStore, SnapshotInfo, DEFAULT_TTL_HOURS};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
