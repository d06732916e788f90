use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::notify::Notification;
use crate::reconciler::{ArticleLookup, FetchOutcome};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and toast expiry
  Tick,
  /// Toast from the reconciler
  Notify(Notification),
  /// Article detail resolved (or not) for a slug
  ArticleLoaded {
    slug: String,
    lookup: Option<Box<ArticleLookup>>,
  },
  /// A manual refresh finished; `None` when skipped while offline
  Refreshed(Option<FetchOutcome>),
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
  tick_rate: Duration,
}

impl EventHandler {
  /// Create the event channel. Terminal input is read once `start` is called.
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { tx, rx, tick_rate }
  }

  /// Spawn the terminal event reader
  pub fn start(&self) {
    let tx = self.tx.clone();
    let tick_rate = self.tick_rate;

    // crossterm polling blocks, keep it off the async workers
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if key.kind == KeyEventKind::Press && tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if tx.send(Event::Tick).is_err() {
        break;
      }
    });
  }

  /// Sender for async tasks that report back to the UI
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
