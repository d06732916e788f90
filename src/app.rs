use crate::cache::CacheStore;
use crate::config::Config;
use crate::content::ContentFetcher;
use crate::event::{Event, EventHandler};
use crate::network::ConnectivitySignal;
use crate::notify::{ChannelNotifier, Notification};
use crate::reconciler::{ArticleLookup, DisplayState, FetchOutcome, Reconciler, ReconcilerContext};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// How often the UI redraws without input
const TICK_RATE: Duration = Duration::from_millis(250);

/// How long a toast stays on screen
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Most toasts shown at once
const MAX_TOASTS: usize = 3;

/// View state - each variant owns its data
#[derive(Debug)]
pub enum ViewState {
  ArticleList {
    selected: usize,
  },
  ArticleDetail {
    article: Box<ArticleLookup>,
    scroll: u16,
  },
}

/// A notification with the time it arrived
#[derive(Debug, Clone)]
pub struct Toast {
  pub notification: Notification,
  shown_at: Instant,
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always the article list
  view_stack: Vec<ViewState>,

  config: Config,

  reconciler: Reconciler,

  display: watch::Receiver<DisplayState>,

  events: EventHandler,

  toasts: Vec<Toast>,

  /// Slug of the article being resolved, if any
  opening: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, store: CacheStore, fetcher: Arc<dyn ContentFetcher>) -> Self {
    let events = EventHandler::new(TICK_RATE);
    let notifier = ChannelNotifier::new(events.sender(), Event::Notify);

    let reconciler = Reconciler::new(
      ReconcilerContext {
        store,
        fetcher,
        notifier: Arc::new(notifier),
      },
      config.limit,
    );
    let display = reconciler.subscribe();

    Self {
      view_stack: vec![ViewState::ArticleList { selected: 0 }],
      config,
      reconciler,
      display,
      events,
      toasts: Vec::new(),
      opening: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self, signal: &ConnectivitySignal) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    self.events.start();
    let _reconciler = self.reconciler.start(signal.observe());

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match self.events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.expire_toasts(),
      Event::Notify(notification) => self.push_toast(notification),
      Event::ArticleLoaded { slug, lookup } => self.article_loaded(slug, lookup),
      Event::Refreshed(outcome) => self.refreshed(outcome),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('q') | KeyCode::Esc => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else if key.code == KeyCode::Char('q') {
          self.should_quit = true;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Home | KeyCode::Char('g') => self.move_selection(i32::MIN),
      KeyCode::End | KeyCode::Char('G') => self.move_selection(i32::MAX),
      KeyCode::Enter => self.open_selected(),
      KeyCode::Char('r') => self.request_refresh(),
      _ => {}
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.display.borrow().items.len();

    if let Some(view) = self.view_stack.last_mut() {
      match view {
        ViewState::ArticleList { selected } => {
          *selected = step(*selected, delta, len);
        }
        ViewState::ArticleDetail { scroll, .. } => {
          *scroll = match delta {
            i32::MIN => 0,
            d if d < 0 => scroll.saturating_sub(1),
            _ => scroll.saturating_add(1),
          };
        }
      }
    }
  }

  fn open_selected(&mut self) {
    let Some(ViewState::ArticleList { selected }) = self.view_stack.last() else {
      return;
    };
    let Some(slug) = self
      .display
      .borrow()
      .items
      .get(*selected)
      .map(|item| item.slug.clone())
    else {
      return;
    };

    self.opening = Some(slug.clone());
    let reconciler = self.reconciler.clone();
    let tx = self.events.sender();

    tokio::spawn(async move {
      let lookup = reconciler.article(&slug).await.map(Box::new);
      let _ = tx.send(Event::ArticleLoaded { slug, lookup });
    });
  }

  fn article_loaded(&mut self, slug: String, lookup: Option<Box<ArticleLookup>>) {
    // Ignore results for an article the user has moved away from
    if self.opening.as_deref() != Some(slug.as_str()) {
      return;
    }
    self.opening = None;

    match lookup {
      Some(article) => self.view_stack.push(ViewState::ArticleDetail { article, scroll: 0 }),
      None => self.push_toast(
        Notification::warning("Article unavailable")
          .with_description(format!("'{}' is not cached and could not be fetched", slug)),
      ),
    }
  }

  fn request_refresh(&self) {
    let reconciler = self.reconciler.clone();
    let tx = self.events.sender();

    tokio::spawn(async move {
      let outcome = reconciler.refresh_if_online().await;
      let _ = tx.send(Event::Refreshed(outcome));
    });
  }

  fn refreshed(&mut self, outcome: Option<FetchOutcome>) {
    let notification = match outcome {
      None => Notification::info("Offline").with_description("Refresh skipped, showing cached articles"),
      Some(FetchOutcome::Fresh(count)) => Notification::info(format!("Loaded {} articles", count)),
      Some(FetchOutcome::CachedFallback(_)) => {
        Notification::warning("Refresh failed").with_description("Showing cached articles")
      }
      Some(FetchOutcome::Empty) => Notification::warning("No articles available"),
    };
    self.push_toast(notification);

    // The list may have shrunk under the cursor
    let len = self.display.borrow().items.len();
    if let Some(ViewState::ArticleList { selected }) = self.view_stack.first_mut() {
      *selected = (*selected).min(len.saturating_sub(1));
    }
  }

  fn push_toast(&mut self, notification: Notification) {
    self.toasts.push(Toast {
      notification,
      shown_at: Instant::now(),
    });
    if self.toasts.len() > MAX_TOASTS {
      let excess = self.toasts.len() - MAX_TOASTS;
      self.toasts.drain(..excess);
    }
  }

  fn expire_toasts(&mut self) {
    self.toasts.retain(|t| t.shown_at.elapsed() < TOAST_TTL);
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&ViewState> {
    self.view_stack.last()
  }

  pub fn display(&self) -> DisplayState {
    self.display.borrow().clone()
  }

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn toasts(&self) -> &[Toast] {
    &self.toasts
  }

  pub fn is_opening(&self) -> bool {
    self.opening.is_some()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}

impl ViewState {
  /// Get the label for this view in the breadcrumb
  fn breadcrumb_label(&self) -> String {
    match self {
      ViewState::ArticleList { .. } => "Articles".to_string(),
      ViewState::ArticleDetail { article, .. } => article.item.slug.clone(),
    }
  }
}

/// Move a list cursor by `delta`, clamping to `0..len`.
///
/// `i32::MIN`/`i32::MAX` jump to the first/last entry.
fn step(selected: usize, delta: i32, len: usize) -> usize {
  if len == 0 {
    return 0;
  }
  let last = len - 1;
  match delta {
    i32::MIN => 0,
    i32::MAX => last,
    d if d < 0 => selected.saturating_sub(d.unsigned_abs() as usize),
    d => selected.saturating_add(d as usize).min(last),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_step_clamps() {
    assert_eq!(step(0, -1, 5), 0);
    assert_eq!(step(4, 1, 5), 4);
    assert_eq!(step(2, 1, 5), 3);
    assert_eq!(step(2, -1, 5), 1);
  }

  #[test]
  fn test_step_jumps() {
    assert_eq!(step(2, i32::MIN, 5), 0);
    assert_eq!(step(2, i32::MAX, 5), 4);
  }

  #[test]
  fn test_step_empty_list() {
    assert_eq!(step(3, 1, 0), 0);
    assert_eq!(step(0, i32::MAX, 0), 0);
  }
}
