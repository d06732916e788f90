//! Decides whether to show fresh, cached or no content.
//!
//! On start the snapshot is painted synchronously, then a fetch runs if the
//! observer reports online. A successful fetch replaces the display and may
//! refresh the snapshot; an empty or failed one falls back to the snapshot.
//! Connectivity transitions re-enter the same cycle. Fetch failures never
//! escape: the worst case is an empty list.

mod state;

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::CacheStore;
use crate::content::{ContentFetcher, ContentItem};
use crate::network::{NetworkEvent, NetworkObserver};
use crate::notify::{Notification, Notifier};

pub use state::{ArticleLookup, DisplayState, FetchOutcome, Phase};

/// Collaborators injected into a [`Reconciler`].
pub struct ReconcilerContext {
  pub store: CacheStore,
  pub fetcher: Arc<dyn ContentFetcher>,
  pub notifier: Arc<dyn Notifier>,
}

/// Cache reconciler for one article list.
///
/// Cheap to clone; clones share state. Fetches are not de-duplicated: two
/// overlapping fetches both run and whichever finishes last wins.
#[derive(Clone)]
pub struct Reconciler {
  inner: Arc<Inner>,
}

struct Inner {
  ctx: ReconcilerContext,
  /// Cap on fetched and displayed items
  limit: Option<usize>,
  display: watch::Sender<DisplayState>,
  /// Set while offline, consumed by the next online transition
  was_offline: AtomicBool,
}

impl Reconciler {
  pub fn new(ctx: ReconcilerContext, limit: Option<usize>) -> Self {
    let (display, _) = watch::channel(DisplayState::default());
    Self {
      inner: Arc::new(Inner {
        ctx,
        limit,
        display,
        was_offline: AtomicBool::new(false),
      }),
    }
  }

  /// Current display state.
  pub fn display(&self) -> DisplayState {
    self.inner.display.borrow().clone()
  }

  /// Watch display state changes.
  pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
    self.inner.display.subscribe()
  }

  /// Start the reconciler against `observer`.
  ///
  /// The snapshot is painted before this returns. The initial fetch (when
  /// online) and the transition loop run in the background until the
  /// returned guard is dropped.
  pub fn start(&self, mut observer: NetworkObserver) -> ReconcilerGuard {
    if self.mount(observer.is_offline()) {
      let this = self.clone();
      tokio::spawn(async move { this.refresh().await });
    }

    let this = self.clone();
    let events = tokio::spawn(async move {
      while let Some(event) = observer.next_event().await {
        tracing::debug!(?event, "network transition");
        this.handle(event);
      }
    });

    ReconcilerGuard { events }
  }

  /// Paint the snapshot. Returns whether a fetch should follow.
  pub fn mount(&self, offline: bool) -> bool {
    let (cached, captured_at) = self.cached();

    if !cached.is_empty() {
      tracing::debug!(count = cached.len(), "painting snapshot");
      let items = cached.clone();
      self.publish(|state| {
        state.items = items;
        state.is_cached = true;
        state.cached_at = captured_at;
        state.phase = Phase::ShowingCachedInstant;
      });
    }

    if offline {
      tracing::info!("offline at start, skipping fetch");
      self.inner.was_offline.store(true, Ordering::SeqCst);
      self.publish(|state| {
        state.items = cached;
        state.is_cached = true;
        state.cached_at = captured_at;
        state.is_offline = true;
        state.phase = Phase::Offline;
      });
      return false;
    }

    true
  }

  /// React to a connectivity transition.
  ///
  /// Going offline is handled inline. Coming online spawns a fetch and
  /// returns its handle; the task is detached if the handle is dropped.
  pub fn handle(&self, event: NetworkEvent) -> Option<JoinHandle<FetchOutcome>> {
    match event {
      NetworkEvent::Offline => {
        self.go_offline();
        None
      }
      NetworkEvent::Online => {
        let was_offline = self.mark_online();
        let this = self.clone();
        Some(tokio::spawn(async move {
          this.finish_reconnect(was_offline).await
        }))
      }
    }
  }

  /// Fetch once and display fresh items, or fall back to the snapshot.
  pub async fn refresh(&self) -> FetchOutcome {
    self.publish(|state| state.phase = Phase::Fetching);

    match self.inner.ctx.fetcher.fetch_published(self.inner.limit).await {
      Ok(items) if !items.is_empty() => {
        self.persist(&items);
        let count = items.len();
        self.publish(|state| {
          state.items = items;
          state.is_cached = false;
          state.cached_at = None;
          state.phase = Phase::ShowingFresh;
        });
        tracing::info!(count, "showing fresh articles");
        FetchOutcome::Fresh(count)
      }
      Ok(_) => {
        tracing::info!("fetch returned no articles, falling back to snapshot");
        self.fall_back()
      }
      Err(e) => {
        tracing::warn!(error = %e, "fetch failed, falling back to snapshot");
        self.fall_back()
      }
    }
  }

  /// Manual refresh. Does nothing while offline.
  pub async fn refresh_if_online(&self) -> Option<FetchOutcome> {
    let offline = self.inner.display.borrow().is_offline;
    if offline {
      return None;
    }
    Some(self.refresh().await)
  }

  /// Switch to offline and show the snapshot.
  ///
  /// If the snapshot is empty the items already on screen stay.
  pub fn go_offline(&self) {
    self.inner.was_offline.store(true, Ordering::SeqCst);

    let (cached, captured_at) = self.cached();
    self.publish(|state| {
      state.is_offline = true;
      state.phase = Phase::Offline;
      if !cached.is_empty() {
        state.items = cached;
        state.is_cached = true;
        state.cached_at = captured_at;
      }
    });

    self.inner.ctx.notifier.notify(
      Notification::warning("You're offline").with_description("Showing cached articles"),
    );
  }

  /// Resolve one article by slug, preferring the service while online.
  pub async fn article(&self, slug: &str) -> Option<ArticleLookup> {
    let offline = self.inner.display.borrow().is_offline;

    if !offline {
      match self.inner.ctx.fetcher.fetch_by_slug(slug).await {
        Ok(Some(item)) => {
          return Some(ArticleLookup {
            item,
            is_cached: false,
          })
        }
        Ok(None) => tracing::debug!(slug, "article not found, trying snapshot"),
        Err(e) => tracing::warn!(slug, error = %e, "article fetch failed, trying snapshot"),
      }
    }

    self
      .inner
      .ctx
      .store
      .find_by_slug(slug)
      .map(|item| ArticleLookup {
        item,
        is_cached: true,
      })
  }

  /// Mark online; returns whether we had really been offline.
  fn mark_online(&self) -> bool {
    self.publish(|state| state.is_offline = false);
    self.inner.was_offline.swap(false, Ordering::SeqCst)
  }

  async fn finish_reconnect(&self, was_offline: bool) -> FetchOutcome {
    let outcome = self.refresh().await;
    if was_offline && matches!(outcome, FetchOutcome::Fresh(_)) {
      self.inner.ctx.notifier.notify(
        Notification::success("Back online").with_description("Articles refreshed"),
      );
    }
    outcome
  }

  fn fall_back(&self) -> FetchOutcome {
    let (cached, captured_at) = self.cached();
    let outcome = if cached.is_empty() {
      FetchOutcome::Empty
    } else {
      FetchOutcome::CachedFallback(cached.len())
    };

    let from_cache = !cached.is_empty();
    self.publish(|state| {
      state.items = cached;
      state.is_cached = from_cache;
      state.cached_at = captured_at;
      state.phase = Phase::ShowingCachedFallback;
    });

    outcome
  }

  /// Persist a fetched list. A capped fetch never replaces an existing
  /// snapshot, which may hold the full list.
  fn persist(&self, items: &[ContentItem]) {
    let store = &self.inner.ctx.store;
    match self.inner.limit {
      None => store.save(items),
      Some(_) if store.load().is_empty() => store.save(items),
      Some(limit) => tracing::debug!(limit, "keeping existing snapshot over capped fetch"),
    }
  }

  /// Snapshot items truncated to the limit, and their capture time.
  ///
  /// An empty snapshot has no capture time.
  fn cached(&self) -> (Vec<ContentItem>, Option<DateTime<Utc>>) {
    match self.inner.ctx.store.load_with_time() {
      Some((mut items, captured_at)) if !items.is_empty() => {
        if let Some(limit) = self.inner.limit {
          items.truncate(limit);
        }
        (items, Some(captured_at))
      }
      _ => (Vec::new(), None),
    }
  }

  fn publish(&self, update: impl FnOnce(&mut DisplayState)) {
    self.inner.display.send_modify(update);
  }
}

/// Keeps the transition loop alive; dropping it releases the observer.
///
/// Fetches already in flight run to completion.
pub struct ReconcilerGuard {
  events: JoinHandle<()>,
}

impl Drop for ReconcilerGuard {
  fn drop(&mut self) {
    self.events.abort();
  }
}
