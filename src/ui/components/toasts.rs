use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Toast;
use crate::ui::renderfns::utils::level_color;

/// Draw one line per active toast, newest last
pub fn draw_toasts(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
  if toasts.is_empty() {
    return;
  }

  let lines: Vec<Line> = toasts
    .iter()
    .map(|toast| {
      let n = &toast.notification;
      let mut spans = vec![
        Span::styled(" ● ", Style::default().fg(level_color(n.level))),
        Span::styled(n.message.clone(), Style::default().fg(Color::White).bold()),
      ];
      if let Some(description) = &n.description {
        spans.push(Span::styled(
          format!("  {}", description),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Line::from(spans)
    })
    .collect();

  frame.render_widget(Paragraph::new(lines), area);
}
