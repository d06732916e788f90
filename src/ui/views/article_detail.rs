use crate::reconciler::ArticleLookup;
use crate::ui::renderfns::utils::strip_markup;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn draw_article_detail(frame: &mut Frame, area: Rect, article: &ArticleLookup, scroll: u16) {
  let item = &article.item;

  let mut title = format!(" {} ", item.title);
  if article.is_cached {
    title.push_str("[cached] ");
  }

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if article.is_cached {
      Color::Yellow
    } else {
      Color::Blue
    }));

  let mut lines = vec![
    Line::from(vec![
      Span::styled("Published: ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        item.created_at.format("%Y-%m-%d %H:%M").to_string(),
        Style::default().fg(Color::Cyan),
      ),
    ]),
  ];
  if let Some(updated) = item.updated_at {
    lines.push(Line::from(vec![
      Span::styled("Updated:   ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        updated.format("%Y-%m-%d %H:%M").to_string(),
        Style::default().fg(Color::Cyan),
      ),
    ]));
  }
  lines.push(Line::from(vec![
    Span::styled("Slug:      ", Style::default().fg(Color::DarkGray)),
    Span::raw(item.slug.clone()),
  ]));
  lines.push(Line::raw(""));

  lines.extend(strip_markup(&item.body).lines().map(|l| Line::raw(l.to_string())));

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: false })
    .scroll((scroll, 0));

  frame.render_widget(paragraph, area);
}
