use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::utils::format_age;
use crate::reconciler::DisplayState;

/// Draw the header bar with logo, site title and connection state
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, display: &DisplayState) {
  let (_, badge_style) = status_badge(display);
  let badge = badge_text(display, Utc::now());

  let header = Line::from(vec![
    Span::styled(" folio ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", badge), badge_style),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", display.phase.label()),
      Style::default().fg(Color::DarkGray),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Badge label, with the snapshot's age while cached content is shown
fn badge_text(display: &DisplayState, now: DateTime<Utc>) -> String {
  let (badge, _) = status_badge(display);
  match display.cached_at {
    Some(captured_at) if display.is_cached => format!("{} {}", badge, format_age(captured_at, now)),
    _ => badge.to_string(),
  }
}

/// Short connection/source label and its colour
fn status_badge(display: &DisplayState) -> (&'static str, Style) {
  match (display.is_offline, display.is_cached) {
    (true, _) => ("OFFLINE", Style::default().fg(Color::Red).bold()),
    (false, true) => ("CACHED", Style::default().fg(Color::Yellow).bold()),
    (false, false) => ("LIVE", Style::default().fg(Color::Green).bold()),
  }
}
