use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use url::Url;

use super::signal::ConnectivitySignal;
use crate::config::ConnectivityConfig;

/// Periodic reachability check of the data service host.
///
/// This is the process-level stand-in for a browser's online indicator: it
/// feeds a [`ConnectivitySignal`], which only emits on change.
pub struct ConnectivityProbe {
  host: String,
  port: u16,
  interval: Duration,
  timeout: Duration,
  signal: ConnectivitySignal,
}

impl ConnectivityProbe {
  pub fn new(service_url: &str, config: &ConnectivityConfig, signal: ConnectivitySignal) -> Result<Self> {
    let url = Url::parse(service_url)
      .map_err(|e| eyre!("Invalid service url '{}': {}", service_url, e))?;

    let host = url
      .host_str()
      .ok_or_else(|| eyre!("Service url '{}' has no host", service_url))?
      .to_string();
    let port = url
      .port_or_known_default()
      .ok_or_else(|| eyre!("Service url '{}' has no port", service_url))?;

    Ok(Self {
      host,
      port,
      interval: Duration::from_secs(config.probe_interval_secs),
      timeout: Duration::from_secs(config.probe_timeout_secs),
      signal,
    })
  }

  /// Whether a TCP connection to the service host succeeds within the timeout.
  pub async fn check(&self) -> bool {
    let connect = TcpStream::connect((self.host.as_str(), self.port));
    match tokio::time::timeout(self.timeout, connect).await {
      Ok(Ok(_)) => true,
      Ok(Err(e)) => {
        tracing::debug!(host = %self.host, port = self.port, error = %e, "probe failed");
        false
      }
      Err(_) => {
        tracing::debug!(host = %self.host, port = self.port, "probe timed out");
        false
      }
    }
  }

  /// Check once and publish the result.
  pub async fn check_and_publish(&self) -> bool {
    let online = self.check().await;
    self.signal.set_online(online);
    online
  }

  /// Run the probe loop in the background. Abort the handle to stop it.
  pub fn spawn(self) -> JoinHandle<()> {
    tokio::spawn(async move {
      let mut ticker = tokio::time::interval(self.interval);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      loop {
        ticker.tick().await;
        self.check_and_publish().await;
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::network::NetworkEvent;
  use tokio::net::TcpListener;

  fn config() -> ConnectivityConfig {
    ConnectivityConfig {
      probe_interval_secs: 1,
      probe_timeout_secs: 1,
    }
  }

  /// A localhost port with nothing listening on it.
  async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
  }

  #[test]
  fn test_default_port_from_scheme() {
    let probe =
      ConnectivityProbe::new("https://abc.example.co", &config(), ConnectivitySignal::new(true))
        .unwrap();
    assert_eq!(probe.host, "abc.example.co");
    assert_eq!(probe.port, 443);
  }

  #[test]
  fn test_rejects_url_without_host() {
    let result = ConnectivityProbe::new("file:///tmp/x", &config(), ConnectivitySignal::new(true));
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_check_reachable_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let url = format!("http://127.0.0.1:{}", port);
    let probe = ConnectivityProbe::new(&url, &config(), ConnectivitySignal::new(false)).unwrap();

    assert!(probe.check_and_publish().await);
    assert!(probe.signal.is_online());
  }

  #[tokio::test]
  async fn test_spawned_probe_reports_offline() {
    let port = closed_port().await;
    let url = format!("http://127.0.0.1:{}", port);
    let signal = ConnectivitySignal::new(true);
    let mut observer = signal.observe();

    let handle = ConnectivityProbe::new(&url, &config(), signal.clone())
      .unwrap()
      .spawn();

    let event = tokio::time::timeout(Duration::from_secs(3), observer.next_event())
      .await
      .unwrap();
    assert_eq!(event, Some(NetworkEvent::Offline));

    handle.abort();
  }
}
