//! User-visible notifications (toasts).

use tokio::sync::mpsc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Warning,
  Success,
}

/// A fire-and-forget message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
  pub description: Option<String>,
}

impl Notification {
  pub fn new(level: Level, message: impl Into<String>) -> Self {
    Self {
      level,
      message: message.into(),
      description: None,
    }
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(Level::Info, message)
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self::new(Level::Warning, message)
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(Level::Success, message)
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

/// Surface that shows notifications. There is no acknowledgment channel.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used by the non-interactive commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, notification: Notification) {
    let description = notification.description.as_deref().unwrap_or("");
    match notification.level {
      Level::Warning => tracing::warn!(description, "{}", notification.message),
      Level::Info | Level::Success => tracing::info!(description, "{}", notification.message),
    }
  }
}

/// Forwards notifications into an event channel.
pub struct ChannelNotifier<T> {
  tx: mpsc::UnboundedSender<T>,
  wrap: fn(Notification) -> T,
}

impl<T> ChannelNotifier<T> {
  pub fn new(tx: mpsc::UnboundedSender<T>, wrap: fn(Notification) -> T) -> Self {
    Self { tx, wrap }
  }
}

impl<T: Send> Notifier for ChannelNotifier<T> {
  fn notify(&self, notification: Notification) {
    // Receiver gone means the UI has shut down
    let _ = self.tx.send((self.wrap)(notification));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder() {
    let n = Notification::warning("You're offline").with_description("Showing cached articles");
    assert_eq!(n.level, Level::Warning);
    assert_eq!(n.description.as_deref(), Some("Showing cached articles"));
  }

  #[test]
  fn test_channel_notifier_wraps() {
    let (tx, mut rx) = mpsc::unbounded_channel::<(u8, Notification)>();
    let notifier = ChannelNotifier::new(tx, |n| (1, n));

    notifier.notify(Notification::info("hello"));

    let (tag, n) = rx.try_recv().unwrap();
    assert_eq!(tag, 1);
    assert_eq!(n.message, "hello");
  }

  #[test]
  fn test_channel_notifier_ignores_closed_channel() {
    let (tx, rx) = mpsc::unbounded_channel::<Notification>();
    drop(rx);
    ChannelNotifier::new(tx, |n| n).notify(Notification::success("ok"));
  }
}
