//! Tagged errors for the content cache and fetch path.

use thiserror::Error;

/// Failures produced below the reconciler.
///
/// None of these are fatal: the reconciler turns every one of them into a
/// cached-or-empty display state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// The request never produced a usable response (connect, timeout, non-2xx).
  #[error("transport error: {0}")]
  Transport(String),

  /// A response or stored snapshot could not be decoded.
  #[error("parse error: {0}")]
  Parse(String),

  /// The key-value backend rejected a read or write.
  #[error("storage error: {0}")]
  Storage(String),

  #[error("unexpected error: {0}")]
  Unknown(String),
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Error::Storage(e.to_string())
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::Parse(e.to_string())
  }
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      Error::Parse(e.to_string())
    } else if e.is_builder() {
      Error::Unknown(e.to_string())
    } else {
      Error::Transport(e.to_string())
    }
  }
}

/// Convenience alias used throughout the cache and content modules.
pub type Result<T> = std::result::Result<T, Error>;
