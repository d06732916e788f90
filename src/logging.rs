use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `FOLIO_LOG=folio=debug`.
const LOG_ENV: &str = "FOLIO_LOG";

/// Install the global subscriber, writing to a daily log file.
///
/// The terminal belongs to the UI, so nothing is logged to stdout or stderr.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(verbose: bool) -> Result<WorkerGuard> {
  let dir = crate::config::data_dir()?.join("logs");
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "folio.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok(guard)
}
