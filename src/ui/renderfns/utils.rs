use chrono::{DateTime, Utc};
use ratatui::prelude::Color;

use crate::notify::Level;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Reduce HTML/markup to readable plain text.
///
/// Block-level closing tags and `<br>` become line breaks, other tags are
/// dropped and the common entities are decoded.
pub fn strip_markup(body: &str) -> String {
  let mut out = String::with_capacity(body.len());
  let mut tag = String::new();
  let mut in_tag = false;

  for c in body.chars() {
    match (in_tag, c) {
      (false, '<') => {
        in_tag = true;
        tag.clear();
      }
      (true, '>') => {
        in_tag = false;
        let name = tag
          .trim_start_matches('/')
          .split(|c: char| c.is_whitespace() || c == '/')
          .next()
          .unwrap_or("")
          .to_ascii_lowercase();
        let closing = tag.starts_with('/');
        let breaks = matches!(name.as_str(), "br")
          || (closing && matches!(name.as_str(), "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "pre" | "blockquote"));
        if breaks {
          out.push('\n');
        }
      }
      (true, c) => tag.push(c),
      (false, c) => out.push(c),
    }
  }

  let decoded = out
    .replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&");

  // Collapse runs of blank lines
  let mut lines: Vec<&str> = Vec::new();
  for line in decoded.lines().map(str::trim_end) {
    if line.trim().is_empty() && lines.last().map_or(true, |l| l.trim().is_empty()) {
      continue;
    }
    lines.push(line);
  }
  lines.join("\n").trim().to_string()
}

/// Human age of a timestamp, e.g. "5m ago", "3h ago", "2d ago"
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let secs = (now - then).num_seconds().max(0);
  match secs {
    0..=59 => "just now".to_string(),
    60..=3599 => format!("{}m ago", secs / 60),
    3600..=86_399 => format!("{}h ago", secs / 3600),
    _ => format!("{}d ago", secs / 86_400),
  }
}

/// Get the display color for a notification level
pub fn level_color(level: Level) -> Color {
  match level {
    Level::Info => Color::Cyan,
    Level::Warning => Color::Yellow,
    Level::Success => Color::Green,
  }
}
