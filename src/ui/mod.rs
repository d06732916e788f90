mod components;
mod renderfns;
mod views;

pub use renderfns::utils::format_age;

use crate::app::{App, ViewState};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let display = app.display();
  let toast_height = app.toasts().len() as u16;

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),            // Header
      Constraint::Min(1),               // Main content
      Constraint::Length(toast_height), // Toasts
      Constraint::Length(1),            // Breadcrumb
      Constraint::Length(1),            // Status bar
    ])
    .split(frame.area());

  renderfns::header::draw_header(frame, chunks[0], &app.title(), &display);

  if let Some(view) = app.current_view() {
    match view {
      ViewState::ArticleList { selected } => {
        views::article_list::draw_article_list(frame, chunks[1], &display, *selected, app.is_opening());
      }
      ViewState::ArticleDetail { article, scroll } => {
        views::article_detail::draw_article_detail(frame, chunks[1], article, *scroll);
      }
    }
  }

  components::toasts::draw_toasts(frame, chunks[2], app.toasts());
  components::footer::draw_footer(frame, chunks[3], &app.view_breadcrumb());
  draw_status_bar(frame, chunks[4], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let hint = match app.current_view() {
    Some(ViewState::ArticleDetail { .. }) => " j/k:scroll  g:top  q:back  Ctrl-C:quit",
    _ => " j/k:nav  Enter:open  r:refresh  q:quit",
  };

  let paragraph = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}
