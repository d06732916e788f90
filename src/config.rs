use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub service: ServiceConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub connectivity: ConnectivityConfig,
  /// Cap on listed articles (unbounded if not set)
  pub limit: Option<usize>,
  /// Custom title for header (defaults to the service host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Base URL of the hosted data service, e.g. "https://abc.supabase.co"
  pub url: String,
  /// Table holding the articles
  #[serde(default = "default_table")]
  pub table: String,
  /// Per-request timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Persist the snapshot on disk; when false it lives for the session only
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default = "default_ttl_hours")]
  pub ttl_hours: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_hours: default_ttl_hours(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectivityConfig {
  #[serde(default = "default_probe_interval_secs")]
  pub probe_interval_secs: u64,
  #[serde(default = "default_probe_timeout_secs")]
  pub probe_timeout_secs: u64,
}

impl Default for ConnectivityConfig {
  fn default() -> Self {
    Self {
      probe_interval_secs: default_probe_interval_secs(),
      probe_timeout_secs: default_probe_timeout_secs(),
    }
  }
}

fn default_table() -> String {
  "articles".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_true() -> bool {
  true
}

/// Longest accepted snapshot lifetime: one year
const MAX_TTL_HOURS: i64 = 24 * 365;

fn default_ttl_hours() -> i64 {
  crate::cache::DEFAULT_TTL_HOURS
}

fn default_probe_interval_secs() -> u64 {
  15
}

fn default_probe_timeout_secs() -> u64 {
  3
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/folio/config.yaml\n\
                 with at least:\n\n  service:\n    url: https://<project>.supabase.co"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    Url::parse(&self.service.url)
      .map_err(|e| eyre!("service.url '{}' is not a valid URL: {}", self.service.url, e))?;

    if self.cache.ttl_hours <= 0 {
      return Err(eyre!("cache.ttl_hours must be positive"));
    }
    if self.cache.ttl_hours > MAX_TTL_HOURS {
      return Err(eyre!("cache.ttl_hours must be at most {}", MAX_TTL_HOURS));
    }
    if self.limit == Some(0) {
      return Err(eyre!("limit must be at least 1"));
    }
    if self.connectivity.probe_interval_secs == 0 {
      return Err(eyre!("connectivity.probe_interval_secs must be at least 1"));
    }

    Ok(())
  }

  /// Origin of the data service, used to scope the offline snapshot.
  pub fn origin(&self) -> String {
    Url::parse(&self.service.url)
      .map(|u| u.origin().ascii_serialization())
      .unwrap_or_else(|_| self.service.url.clone())
  }

  /// Header title: configured title, or the service host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    Url::parse(&self.service.url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.service.url.clone())
  }

  /// Get the service's anonymous API key from the environment.
  ///
  /// Checks FOLIO_SERVICE_KEY. Public endpoints work without one.
  pub fn get_service_key() -> Option<String> {
    std::env::var("FOLIO_SERVICE_KEY")
      .ok()
      .filter(|key| !key.trim().is_empty())
  }
}

/// Directory for the cache database and logs.
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("folio"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::from_yaml("service:\n  url: https://abc.supabase.co\n").unwrap();

    assert_eq!(config.service.table, "articles");
    assert_eq!(config.service.timeout_secs, 10);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_hours, 24);
    assert_eq!(config.connectivity.probe_interval_secs, 15);
    assert_eq!(config.limit, None);
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
service:
  url: https://abc.supabase.co
  table: posts
  timeout_secs: 4
cache:
  enabled: false
  ttl_hours: 6
connectivity:
  probe_interval_secs: 30
  probe_timeout_secs: 1
limit: 10
title: "~/blog"
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.service.table, "posts");
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.ttl_hours, 6);
    assert_eq!(config.limit, Some(10));
    assert_eq!(config.display_title(), "~/blog");
  }

  #[test]
  fn test_rejects_invalid_url() {
    assert!(Config::from_yaml("service:\n  url: not-a-url\n").is_err());
  }

  #[test]
  fn test_rejects_zero_limit() {
    assert!(Config::from_yaml("service:\n  url: https://a.example.com\nlimit: 0\n").is_err());
  }

  #[test]
  fn test_rejects_non_positive_ttl() {
    let yaml = "service:\n  url: https://a.example.com\ncache:\n  ttl_hours: 0\n";
    assert!(Config::from_yaml(yaml).is_err());
  }

  #[test]
  fn test_rejects_oversized_ttl() {
    let yaml = "service:\n  url: https://a.example.com\ncache:\n  ttl_hours: 9000000000000000\n";
    assert!(Config::from_yaml(yaml).is_err());

    let yaml = "service:\n  url: https://a.example.com\ncache:\n  ttl_hours: 8760\n";
    assert_eq!(Config::from_yaml(yaml).unwrap().cache.ttl_hours, 8760);
  }

  #[test]
  fn test_origin_drops_path() {
    let config = Config::from_yaml("service:\n  url: https://abc.supabase.co/some/path\n").unwrap();
    assert_eq!(config.origin(), "https://abc.supabase.co");
    assert_eq!(config.display_title(), "abc.supabase.co");
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("not found"));
  }
}
