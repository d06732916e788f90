use futures::future::BoxFuture;

use super::types::ContentItem;
use crate::error::Result;

/// Read access to published content in the remote data service.
///
/// Implementations make at most one attempt per call and convert every
/// failure into an [`Error`](crate::error::Error) instead of panicking.
/// Retry policy, if any, belongs to the caller.
pub trait ContentFetcher: Send + Sync {
  /// Published items, newest first, optionally capped at `limit`.
  fn fetch_published(&self, limit: Option<usize>) -> BoxFuture<'_, Result<Vec<ContentItem>>>;

  /// A single published item by slug. `Ok(None)` when the service has no match.
  fn fetch_by_slug<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Option<ContentItem>>>;
}
