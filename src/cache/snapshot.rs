//! Time-boxed offline snapshot of the article list.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::storage::KeyValueStore;
use crate::content::ContentItem;
use crate::error::{Error, Result};

/// Snapshots older than this are ignored.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Prefix of the storage key holding the snapshot.
const KEY_PREFIX: &str = "articles_cache";

/// Serialized form of the snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
  items: Vec<ContentItem>,
  /// Capture instant in epoch milliseconds
  timestamp: i64,
}

/// Metadata about the stored snapshot, valid or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
  pub count: usize,
  pub captured_at: DateTime<Utc>,
  pub expired: bool,
}

/// Persistent cache of the most recent article list.
///
/// Reads and writes never fail to the caller. A missing, corrupt or expired
/// snapshot loads as an empty list; a failed write is logged and dropped.
#[derive(Clone)]
pub struct CacheStore {
  backend: Arc<dyn KeyValueStore>,
  clock: Arc<dyn Clock>,
  key: String,
  ttl: Duration,
}

impl CacheStore {
  /// Create a store whose key is scoped to the given service origin.
  pub fn new(backend: Arc<dyn KeyValueStore>, origin: &str) -> Self {
    Self {
      backend,
      clock: Arc::new(SystemClock),
      key: storage_key(origin),
      ttl: Duration::hours(DEFAULT_TTL_HOURS),
    }
  }

  #[cfg(test)]
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Overwrite the snapshot with `items`, stamped with the current time.
  pub fn save(&self, items: &[ContentItem]) {
    let snapshot = SnapshotRef {
      items,
      timestamp: self.clock.now().timestamp_millis(),
    };

    let result = serde_json::to_string(&snapshot)
      .map_err(Error::from)
      .and_then(|json| self.backend.set(&self.key, &json));

    match result {
      Ok(()) => tracing::debug!(key = %self.key, count = items.len(), "saved snapshot"),
      Err(e) => tracing::warn!(key = %self.key, error = %e, "failed to save snapshot"),
    }
  }

  /// Items of the current snapshot, or empty when there is no valid one.
  pub fn load(&self) -> Vec<ContentItem> {
    self.load_with_time().map(|(items, _)| items).unwrap_or_default()
  }

  /// Items of the valid snapshot together with when they were captured.
  pub fn load_with_time(&self) -> Option<(Vec<ContentItem>, DateTime<Utc>)> {
    let snapshot = match self.read() {
      Ok(snapshot) => snapshot?,
      Err(e) => {
        tracing::warn!(key = %self.key, error = %e, "ignoring unreadable snapshot");
        return None;
      }
    };

    match DateTime::from_timestamp_millis(snapshot.timestamp) {
      Some(captured_at) if self.is_fresh(captured_at) => Some((snapshot.items, captured_at)),
      _ => {
        tracing::debug!(key = %self.key, timestamp = snapshot.timestamp, "snapshot expired");
        None
      }
    }
  }

  /// Look up one article in the valid snapshot.
  pub fn find_by_slug(&self, slug: &str) -> Option<ContentItem> {
    self.load().into_iter().find(|item| item.slug == slug)
  }

  /// Describe the stored snapshot without applying the TTL.
  pub fn snapshot_info(&self) -> Option<SnapshotInfo> {
    let snapshot = self.read().ok().flatten()?;
    let captured_at = DateTime::from_timestamp_millis(snapshot.timestamp)?;

    Some(SnapshotInfo {
      count: snapshot.items.len(),
      captured_at,
      expired: !self.is_fresh(captured_at),
    })
  }

  /// Remove the snapshot.
  pub fn clear(&self) {
    if let Err(e) = self.backend.remove(&self.key) {
      tracing::warn!(key = %self.key, error = %e, "failed to clear snapshot");
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  fn read(&self) -> Result<Option<Snapshot>> {
    match self.backend.get(&self.key)? {
      Some(json) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  fn is_fresh(&self, captured_at: DateTime<Utc>) -> bool {
    self.clock.now() - captured_at < self.ttl
  }
}

/// Borrowing twin of [`Snapshot`] so saving does not clone the items.
#[derive(Serialize)]
struct SnapshotRef<'a> {
  items: &'a [ContentItem],
  timestamp: i64,
}

/// Storage key for a service origin, e.g. `articles_cache:3f2a9c...`.
pub fn storage_key(origin: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(origin.trim_end_matches('/').as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("{}:{}", KEY_PREFIX, &digest[..16])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;
  use crate::test_support::{item, items, FixedClock};

  fn store_with_clock() -> (CacheStore, Arc<MemoryStore>, Arc<FixedClock>) {
    let backend = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::default());
    let store = CacheStore::new(backend.clone(), "https://blog.example.com").with_clock(clock.clone());
    (store, backend, clock)
  }

  #[test]
  fn test_load_empty_when_absent() {
    let (store, _, _) = store_with_clock();
    assert!(store.load().is_empty());
    assert!(store.snapshot_info().is_none());
  }

  #[test]
  fn test_save_then_load_within_ttl() {
    let (store, _, clock) = store_with_clock();
    let articles = items(3);

    store.save(&articles);
    clock.advance(Duration::hours(23));

    assert_eq!(store.load(), articles);
  }

  #[test]
  fn test_load_with_time_reports_capture_instant() {
    let (store, _, clock) = store_with_clock();
    let saved_at = clock.now();
    store.save(&items(2));
    clock.advance(Duration::minutes(30));

    assert_eq!(store.load_with_time(), Some((items(2), saved_at)));

    clock.advance(Duration::hours(24));
    assert_eq!(store.load_with_time(), None);
  }

  #[test]
  fn test_expired_snapshot_loads_empty() {
    let (store, _, clock) = store_with_clock();
    store.save(&items(2));

    clock.advance(Duration::hours(24));
    assert!(store.load().is_empty());

    // Still well-formed and reported, just not trusted
    let info = store.snapshot_info().unwrap();
    assert_eq!(info.count, 2);
    assert!(info.expired);
  }

  #[test]
  fn test_save_overwrites_previous_snapshot() {
    let (store, _, _) = store_with_clock();
    store.save(&items(5));
    store.save(&[item(9)]);

    assert_eq!(store.load(), vec![item(9)]);
  }

  #[test]
  fn test_corrupt_entry_is_cache_miss() {
    let (store, backend, _) = store_with_clock();
    backend.set(store.key(), "{not json").unwrap();

    assert!(store.load().is_empty());
    assert!(store.snapshot_info().is_none());
  }

  #[test]
  fn test_wrong_shape_is_cache_miss() {
    let (store, backend, _) = store_with_clock();
    backend.set(store.key(), r#"{"items": 3, "timestamp": "now"}"#).unwrap();

    assert!(store.load().is_empty());
  }

  #[test]
  fn test_quota_failure_is_swallowed() {
    let backend = Arc::new(MemoryStore::new().with_quota(16));
    let store = CacheStore::new(backend, "https://blog.example.com");

    store.save(&items(4));
    assert!(store.load().is_empty());
  }

  #[test]
  fn test_find_by_slug() {
    let (store, _, _) = store_with_clock();
    store.save(&items(3));

    assert_eq!(store.find_by_slug("post-1"), Some(item(1)));
    assert_eq!(store.find_by_slug("missing"), None);
  }

  #[test]
  fn test_clear_removes_snapshot() {
    let (store, _, _) = store_with_clock();
    store.save(&items(1));
    store.clear();

    assert!(store.load().is_empty());
  }

  #[test]
  fn test_storage_key_is_per_origin() {
    let a = storage_key("https://a.example.com");
    let b = storage_key("https://b.example.com");

    assert_ne!(a, b);
    assert!(a.starts_with("articles_cache:"));
    assert_eq!(a.len(), "articles_cache:".len() + 16);
    assert_eq!(a, storage_key("https://a.example.com/"));
  }

  #[test]
  fn test_shorter_ttl() {
    let (store, _, clock) = store_with_clock();
    let store = store.with_ttl(Duration::minutes(5));
    store.save(&items(1));

    clock.advance(Duration::minutes(6));
    assert!(store.load().is_empty());
  }
}
