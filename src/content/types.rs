use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single publishable article as returned by the data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
  pub id: String,
  pub title: String,
  pub slug: String,
  /// Markup body; the service names this column `content`
  #[serde(rename = "content")]
  pub body: String,
  /// List queries filter on this, so it is usually absent from the response
  #[serde(default = "default_published")]
  pub published: bool,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
  true
}

impl ContentItem {
  /// Timestamp shown in list views: last update if known, otherwise creation.
  pub fn display_date(&self) -> DateTime<Utc> {
    self.updated_at.unwrap_or(self.created_at)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_service_row() {
    let json = r#"{
      "id": "7f3c",
      "title": "Hello",
      "slug": "hello",
      "content": "<p>hi</p>",
      "created_at": "2024-03-01T10:00:00+00:00"
    }"#;

    let item: ContentItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.body, "<p>hi</p>");
    assert!(item.published);
    assert!(item.updated_at.is_none());
    assert_eq!(item.display_date(), item.created_at);
  }

  #[test]
  fn test_display_date_prefers_updated() {
    let json = r#"{
      "id": "1",
      "title": "t",
      "slug": "t",
      "content": "",
      "published": false,
      "created_at": "2024-03-01T10:00:00Z",
      "updated_at": "2024-04-01T10:00:00Z"
    }"#;

    let item: ContentItem = serde_json::from_str(json).unwrap();
    assert!(!item.published);
    assert_eq!(item.display_date(), item.updated_at.unwrap());
  }
}
