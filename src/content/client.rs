//! REST client for a PostgREST-style content endpoint.

use color_eyre::{eyre::eyre, Result as EyreResult};
use futures::future::{BoxFuture, FutureExt};
use std::time::Duration;
use url::Url;

use super::fetcher::ContentFetcher;
use super::types::ContentItem;
use crate::config::ServiceConfig;
use crate::error::{Error, Result};

/// Columns selected for list views.
const LIST_COLUMNS: &str = "id,title,slug,content,created_at";

/// Columns selected for a single article.
const DETAIL_COLUMNS: &str = "id,title,slug,content,published,created_at,updated_at";

/// Content fetcher backed by the hosted data service's REST interface.
#[derive(Clone)]
pub struct RestContentFetcher {
  http: reqwest::Client,
  table_url: Url,
  api_key: Option<String>,
}

impl RestContentFetcher {
  pub fn new(service: &ServiceConfig, api_key: Option<String>) -> EyreResult<Self> {
    let table_url = table_url(&service.url, &service.table)?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(service.timeout_secs))
      .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      table_url,
      api_key,
    })
  }

  fn list_url(&self, limit: Option<usize>) -> Url {
    let mut url = self.table_url.clone();
    {
      let mut query = url.query_pairs_mut();
      query
        .append_pair("select", LIST_COLUMNS)
        .append_pair("published", "eq.true")
        .append_pair("order", "created_at.desc");
      if let Some(limit) = limit {
        query.append_pair("limit", &limit.to_string());
      }
    }
    url
  }

  fn slug_url(&self, slug: &str) -> Url {
    let mut url = self.table_url.clone();
    url
      .query_pairs_mut()
      .append_pair("select", DETAIL_COLUMNS)
      .append_pair("published", "eq.true")
      .append_pair("slug", &format!("eq.{}", slug))
      .append_pair("limit", "1");
    url
  }

  /// Issue a single GET and decode the row array.
  async fn get_rows(&self, url: Url) -> Result<Vec<ContentItem>> {
    let mut request = self.http.get(url.clone());
    if let Some(key) = &self.api_key {
      request = request.header("apikey", key).bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(Error::Transport(format!(
        "{} returned {}",
        url.path(),
        status
      )));
    }

    let body = response.bytes().await?;
    let rows: Vec<ContentItem> = serde_json::from_slice(&body)?;

    tracing::debug!(path = url.path(), rows = rows.len(), "fetched content rows");
    Ok(rows)
  }
}

impl ContentFetcher for RestContentFetcher {
  fn fetch_published(&self, limit: Option<usize>) -> BoxFuture<'_, Result<Vec<ContentItem>>> {
    let url = self.list_url(limit);
    async move { self.get_rows(url).await }.boxed()
  }

  fn fetch_by_slug<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Option<ContentItem>>> {
    let url = self.slug_url(slug);
    async move {
      self
        .get_rows(url)
        .await
        .map(|rows| rows.into_iter().next())
    }
    .boxed()
  }
}

/// Build `{base}/rest/v1/{table}`, keeping any path prefix on the base URL.
fn table_url(base: &str, table: &str) -> EyreResult<Url> {
  let mut url = Url::parse(base).map_err(|e| eyre!("Invalid service url '{}': {}", base, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }

  url
    .join(&format!("rest/v1/{}", table))
    .map_err(|e| eyre!("Invalid table name '{}': {}", table, e))
}
