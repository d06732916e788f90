use chrono::{DateTime, Utc};

use crate::content::ContentItem;

/// Where the reconciler is in its fetch-or-fallback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  #[default]
  Initial,
  /// Snapshot painted at start, before any fetch resolved
  ShowingCachedInstant,
  Fetching,
  ShowingFresh,
  /// Fetch returned nothing or failed; showing the snapshot (or nothing)
  ShowingCachedFallback,
  Offline,
}

impl Phase {
  pub fn label(self) -> &'static str {
    match self {
      Phase::Initial => "starting",
      Phase::ShowingCachedInstant => "cached",
      Phase::Fetching => "refreshing",
      Phase::ShowingFresh => "live",
      Phase::ShowingCachedFallback => "cached (fetch failed)",
      Phase::Offline => "offline",
    }
  }
}

/// What the presentation layer shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
  pub items: Vec<ContentItem>,
  pub is_offline: bool,
  /// Items came from the snapshot rather than a fresh fetch
  pub is_cached: bool,
  /// Capture time of the snapshot on screen, when `is_cached`
  pub cached_at: Option<DateTime<Utc>>,
  pub phase: Phase,
}

/// Result of one fetch-or-fallback pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  /// Fresh items displayed
  Fresh(usize),
  /// Snapshot items displayed after an empty or failed fetch
  CachedFallback(usize),
  /// Nothing to show
  Empty,
}

/// A single article and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLookup {
  pub item: ContentItem,
  pub is_cached: bool,
}
