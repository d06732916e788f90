use crate::reconciler::{DisplayState, Phase};
use crate::ui::renderfns::utils::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_article_list(
  frame: &mut Frame,
  area: Rect,
  display: &DisplayState,
  selected: usize,
  opening: bool,
) {
  let loading = matches!(display.phase, Phase::Initial | Phase::Fetching);
  let title = if loading {
    format!(" Articles ({}) refreshing... ", display.items.len())
  } else if opening {
    format!(" Articles ({}) opening... ", display.items.len())
  } else {
    format!(" Articles ({}) ", display.items.len())
  };

  let border = if display.is_offline {
    Color::Red
  } else if display.is_cached {
    Color::Yellow
  } else {
    Color::Blue
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  if display.items.is_empty() {
    let message = if loading {
      "Loading articles..."
    } else if display.is_offline {
      "You're offline and no articles are cached yet."
    } else {
      "No articles found."
    };
    let paragraph = Paragraph::new(message)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  // Date column plus borders and highlight symbol
  let title_width = (area.width as usize).saturating_sub(16);

  let items: Vec<ListItem> = display
    .items
    .iter()
    .map(|article| {
      let line = Line::from(vec![
        Span::styled(
          article.display_date().format("%Y-%m-%d").to_string(),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::raw(truncate(&article.title, title_width)),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected.min(display.items.len() - 1)));

  frame.render_stateful_widget(list, area, &mut state);
}
