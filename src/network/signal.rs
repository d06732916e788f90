use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;

/// Buffered transitions per observer before it has to resynchronize.
const EVENT_BUFFER: usize = 16;

/// A connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
  Online,
  Offline,
}

impl NetworkEvent {
  fn from_online(online: bool) -> Self {
    if online {
      Self::Online
    } else {
      Self::Offline
    }
  }

  pub fn is_online(self) -> bool {
    self == Self::Online
  }
}

/// The runtime's online indicator: a current value plus change events.
#[derive(Clone)]
pub struct ConnectivitySignal {
  inner: Arc<SignalInner>,
}

struct SignalInner {
  online: AtomicBool,
  tx: broadcast::Sender<NetworkEvent>,
}

impl ConnectivitySignal {
  pub fn new(online: bool) -> Self {
    let (tx, _) = broadcast::channel(EVENT_BUFFER);
    Self {
      inner: Arc::new(SignalInner {
        online: AtomicBool::new(online),
        tx,
      }),
    }
  }

  pub fn is_online(&self) -> bool {
    self.inner.online.load(Ordering::SeqCst)
  }

  /// Record the current connectivity. Emits an event only on change.
  ///
  /// Returns whether the value changed.
  pub fn set_online(&self, online: bool) -> bool {
    let previous = self.inner.online.swap(online, Ordering::SeqCst);
    if previous == online {
      return false;
    }

    tracing::info!(online, "connectivity changed");
    // No subscribers is fine
    let _ = self.inner.tx.send(NetworkEvent::from_online(online));
    true
  }

  /// Subscribe a new observer.
  pub fn observe(&self) -> NetworkObserver {
    // Subscribe before reading so no transition falls in between
    let rx = self.inner.tx.subscribe();
    NetworkObserver {
      offline: !self.is_online(),
      signal: Arc::downgrade(&self.inner),
      rx,
    }
  }

  /// Number of live observers.
  #[cfg(test)]
  pub fn observer_count(&self) -> usize {
    self.inner.tx.receiver_count()
  }
}

/// Subscription to a [`ConnectivitySignal`].
///
/// Dropping the observer ends the subscription. The observer does not keep
/// the signal alive.
pub struct NetworkObserver {
  offline: bool,
  signal: Weak<SignalInner>,
  rx: broadcast::Receiver<NetworkEvent>,
}

impl NetworkObserver {
  pub fn is_offline(&self) -> bool {
    self.offline
  }

  /// Wait for the next transition away from the observer's current state.
  ///
  /// Returns `None` once every handle to the signal has been dropped.
  pub async fn next_event(&mut self) -> Option<NetworkEvent> {
    loop {
      let event = match self.rx.recv().await {
        Ok(event) => event,
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "connectivity observer lagged, resynchronizing");
          let inner = self.signal.upgrade()?;
          NetworkEvent::from_online(inner.online.load(Ordering::SeqCst))
        }
        Err(broadcast::error::RecvError::Closed) => return None,
      };

      if event.is_online() == self.offline {
        self.offline = !event.is_online();
        return Some(event);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn test_initial_state_from_signal() {
    assert!(!ConnectivitySignal::new(true).observe().is_offline());
    assert!(ConnectivitySignal::new(false).observe().is_offline());
  }

  #[test]
  fn test_set_same_value_is_not_a_change() {
    let signal = ConnectivitySignal::new(true);
    assert!(!signal.set_online(true));
    assert!(signal.set_online(false));
    assert!(!signal.is_online());
  }

  #[tokio::test]
  async fn test_every_transition_is_delivered() {
    let signal = ConnectivitySignal::new(true);
    let mut observer = signal.observe();

    signal.set_online(false);
    signal.set_online(true);
    signal.set_online(false);

    assert_eq!(observer.next_event().await, Some(NetworkEvent::Offline));
    assert!(observer.is_offline());
    assert_eq!(observer.next_event().await, Some(NetworkEvent::Online));
    assert_eq!(observer.next_event().await, Some(NetworkEvent::Offline));
  }

  #[tokio::test]
  async fn test_no_event_without_change() {
    let signal = ConnectivitySignal::new(true);
    let mut observer = signal.observe();

    signal.set_online(true);

    let next = tokio::time::timeout(Duration::from_millis(20), observer.next_event()).await;
    assert!(next.is_err(), "expected no event");
  }

  #[tokio::test]
  async fn test_lagged_observer_resyncs_to_current_value() {
    let signal = ConnectivitySignal::new(true);
    let mut observer = signal.observe();

    // Overflow the buffer, ending offline
    for _ in 0..EVENT_BUFFER {
      signal.set_online(false);
      signal.set_online(true);
    }
    signal.set_online(false);

    let mut last = None;
    while let Ok(Some(event)) =
      tokio::time::timeout(Duration::from_millis(20), observer.next_event()).await
    {
      last = Some(event);
    }

    assert_eq!(last, Some(NetworkEvent::Offline));
    assert!(observer.is_offline());
  }

  #[tokio::test]
  async fn test_observer_ends_when_signal_dropped() {
    let signal = ConnectivitySignal::new(true);
    let mut observer = signal.observe();

    drop(signal);

    let next = tokio::time::timeout(Duration::from_millis(100), observer.next_event()).await;
    assert!(matches!(next, Ok(None)));
  }

  #[test]
  fn test_drop_unsubscribes() {
    let signal = ConnectivitySignal::new(true);
    let observer = signal.observe();
    assert_eq!(signal.observer_count(), 1);

    drop(observer);
    assert_eq!(signal.observer_count(), 0);
  }
}
