mod app;
mod cache;
mod config;
mod content;
mod error;
mod event;
mod logging;
mod network;
mod notify;
mod reconciler;
#[cfg(test)]
mod test_support;
mod ui;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{CacheStore, KeyValueStore, MemoryStore, SnapshotInfo, SqliteStore};
use crate::config::Config;
use crate::content::{ContentFetcher, RestContentFetcher};
use crate::network::{ConnectivityProbe, ConnectivitySignal};
use crate::notify::LogNotifier;
use crate::reconciler::{Reconciler, ReconcilerContext};
use crate::ui::format_age;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "An offline-aware terminal reader for portfolio site articles")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Show at most this many articles
  #[arg(short, long)]
  limit: Option<usize>,

  /// Log at debug level (overridden by FOLIO_LOG)
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse articles interactively (default)
  Browse,
  /// Print the article list once and exit
  List {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
  },
  /// Inspect or clear the offline snapshot
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
  /// Show what the snapshot holds and how old it is
  Show,
  /// Delete the snapshot
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override limit if specified on command line
  let config = match args.limit {
    Some(0) => return Err(eyre!("--limit must be at least 1")),
    Some(limit) => Config {
      limit: Some(limit),
      ..config
    },
    None => config,
  };

  let _log_guard = logging::init(args.verbose)?;
  tracing::info!(service = %config.service.url, limit = ?config.limit, "starting");

  let store = open_store(&config)?;

  match args.command.unwrap_or(Command::Browse) {
    Command::Browse => browse(config, store).await,
    Command::List { json } => list(config, store, json).await,
    Command::Cache { action } => {
      cache_command(&store, action);
      Ok(())
    }
  }
}

/// Open the snapshot store configured for this service.
fn open_store(config: &Config) -> Result<CacheStore> {
  let backend: Arc<dyn KeyValueStore> = if config.cache.enabled {
    Arc::new(SqliteStore::open()?)
  } else {
    Arc::new(MemoryStore::new())
  };

  Ok(CacheStore::new(backend, &config.origin()).with_ttl(Duration::hours(config.cache.ttl_hours)))
}

fn fetcher(config: &Config) -> Result<Arc<dyn ContentFetcher>> {
  Ok(Arc::new(RestContentFetcher::new(
    &config.service,
    Config::get_service_key(),
  )?))
}

/// Probe once so the signal starts from the real connectivity state.
async fn connectivity(config: &Config) -> Result<(ConnectivitySignal, ConnectivityProbe)> {
  let signal = ConnectivitySignal::new(true);
  let probe = ConnectivityProbe::new(&config.service.url, &config.connectivity, signal.clone())?;
  probe.check_and_publish().await;
  Ok((signal, probe))
}

async fn browse(config: Config, store: CacheStore) -> Result<()> {
  let fetcher = fetcher(&config)?;
  let (signal, probe) = connectivity(&config).await?;
  let probe = probe.spawn();

  let mut app = app::App::new(config, store, fetcher);
  let result = app.run(&signal).await;

  probe.abort();
  result
}

async fn list(config: Config, store: CacheStore, json: bool) -> Result<()> {
  let fetcher = fetcher(&config)?;
  let (signal, _) = connectivity(&config).await?;

  let reconciler = Reconciler::new(
    ReconcilerContext {
      store,
      fetcher,
      notifier: Arc::new(LogNotifier),
    },
    config.limit,
  );

  if reconciler.mount(!signal.is_online()) {
    reconciler.refresh().await;
  }
  let display = reconciler.display();

  if json {
    println!("{}", serde_json::to_string_pretty(&display.items)?);
    return Ok(());
  }

  for item in &display.items {
    println!(
      "{}  {}  ({})",
      item.display_date().format("%Y-%m-%d"),
      item.title,
      item.slug
    );
  }

  let source = match (display.is_offline, display.is_cached) {
    (true, _) => "offline, cached",
    (false, true) => "cached",
    (false, false) => "live",
  };
  eprintln!("{} articles ({})", display.items.len(), source);

  Ok(())
}

fn cache_command(store: &CacheStore, action: CacheAction) {
  match action {
    CacheAction::Show => match store.snapshot_info() {
      Some(info) => print_snapshot_info(store.key(), &info),
      None => println!("No snapshot stored"),
    },
    CacheAction::Clear => {
      store.clear();
      tracing::info!(key = store.key(), "snapshot cleared");
      println!("Snapshot cleared");
    }
  }
}

fn print_snapshot_info(key: &str, info: &SnapshotInfo) {
  println!("key:      {}", key);
  println!("articles: {}", info.count);
  println!(
    "captured: {} ({})",
    info.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
    format_age(info.captured_at, Utc::now())
  );
  println!("status:   {}", if info.expired { "expired" } else { "valid" });
}
