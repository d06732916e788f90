//! Fakes shared by unit tests: a settable clock, a scripted fetcher and a
//! recording notifier.

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::future::{BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use crate::cache::Clock;
use crate::content::{ContentFetcher, ContentItem};
use crate::error::{Error, Result};
use crate::notify::{Level, Notification, Notifier};

/// Article `n`, with slug `post-{n}`. Higher `n` is older.
pub fn item(n: usize) -> ContentItem {
  let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
  ContentItem {
    id: format!("id-{}", n),
    title: format!("Post {}", n),
    slug: format!("post-{}", n),
    body: format!("<p>Body of post {}</p>", n),
    published: true,
    created_at: base - Duration::days(n as i64),
    updated_at: None,
  }
}

/// Articles `0..count`, newest first.
pub fn items(count: usize) -> Vec<ContentItem> {
  (0..count).map(item).collect()
}

/// Articles `start..start + count`.
pub fn items_from(start: usize, count: usize) -> Vec<ContentItem> {
  (start..start + count).map(item).collect()
}

/// Clock that only moves when told to.
pub struct FixedClock {
  now: Mutex<DateTime<Utc>>,
}

impl Default for FixedClock {
  fn default() -> Self {
    Self {
      now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap()),
    }
  }
}

impl FixedClock {
  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap();
    *now += by;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap()
  }
}

/// Fetcher that replays queued list responses.
///
/// Once the queue is empty every list fetch returns an empty list. When
/// gated, each call picks its response immediately but waits for
/// [`release`](Self::release) before resolving, in call order.
pub struct ScriptedFetcher {
  responses: Mutex<VecDeque<Result<Vec<ContentItem>>>>,
  detail: Mutex<Option<Result<Option<ContentItem>>>>,
  gate: Option<Semaphore>,
  calls: AtomicUsize,
  detail_calls: AtomicUsize,
  limits: Mutex<Vec<Option<usize>>>,
}

impl ScriptedFetcher {
  pub fn new() -> Self {
    Self {
      responses: Mutex::new(VecDeque::new()),
      detail: Mutex::new(None),
      gate: None,
      calls: AtomicUsize::new(0),
      detail_calls: AtomicUsize::new(0),
      limits: Mutex::new(Vec::new()),
    }
  }

  pub fn respond(self, response: Result<Vec<ContentItem>>) -> Self {
    self.responses.lock().unwrap().push_back(response);
    self
  }

  pub fn respond_detail(self, response: Result<Option<ContentItem>>) -> Self {
    *self.detail.lock().unwrap() = Some(response);
    self
  }

  pub fn gated(mut self) -> Self {
    self.gate = Some(Semaphore::new(0));
    self
  }

  /// Let one waiting fetch resolve.
  pub fn release(&self) {
    if let Some(gate) = &self.gate {
      gate.add_permits(1);
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn detail_calls(&self) -> usize {
    self.detail_calls.load(Ordering::SeqCst)
  }

  pub fn limits(&self) -> Vec<Option<usize>> {
    self.limits.lock().unwrap().clone()
  }
}

impl ContentFetcher for ScriptedFetcher {
  fn fetch_published(&self, limit: Option<usize>) -> BoxFuture<'_, Result<Vec<ContentItem>>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.limits.lock().unwrap().push(limit);
    let response = self
      .responses
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(Vec::new()));

    async move {
      if let Some(gate) = &self.gate {
        match gate.acquire().await {
          Ok(permit) => permit.forget(),
          Err(e) => return Err(Error::Unknown(e.to_string())),
        }
      }
      response
    }
    .boxed()
  }

  fn fetch_by_slug<'a>(&'a self, _slug: &'a str) -> BoxFuture<'a, Result<Option<ContentItem>>> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    let response = self
      .detail
      .lock()
      .unwrap()
      .clone()
      .unwrap_or_else(|| Err(Error::Transport("no detail scripted".to_string())));

    async move { response }.boxed()
  }
}

/// Notifier that remembers everything it was given.
#[derive(Default)]
pub struct RecordingNotifier {
  seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
  pub fn notifications(&self) -> Vec<Notification> {
    self.seen.lock().unwrap().clone()
  }

  pub fn count(&self, level: Level) -> usize {
    self
      .seen
      .lock()
      .unwrap()
      .iter()
      .filter(|n| n.level == level)
      .count()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, notification: Notification) {
    self.seen.lock().unwrap().push(notification);
  }
}
