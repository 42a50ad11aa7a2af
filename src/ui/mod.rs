pub mod grid;
pub mod renderfns;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::view_model::FeedState;
use grid::GridState;

/// What the draw pass needs besides the feed state
pub struct Screen<'a> {
  pub feed_url: &'a str,
  pub columns: usize,
  pub banner: Option<&'a str>,
}

/// Main draw function
pub fn draw(frame: &mut Frame, screen: &Screen, state: &FeedState, grid: &mut GridState) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Grid
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], screen.feed_url, state);

  let block = Block::default()
    .title(" Templates ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  let inner = block.inner(chunks[1]);
  frame.render_widget(block, chunks[1]);

  if state.items.is_empty() {
    draw_placeholder(frame, inner, state);
  } else {
    grid::draw_grid(frame, inner, &state.items, screen.columns, grid);
  }

  if let Some(message) = screen.banner {
    renderfns::draw_banner(frame, inner, message);
  }

  renderfns::draw_footer(frame, chunks[2], grid.selected(), state.items.len());
}

fn draw_placeholder(frame: &mut Frame, area: Rect, state: &FeedState) {
  let content = if state.is_loading {
    "Loading templates..."
  } else {
    "No templates yet. Press 'r' to retry."
  };

  let paragraph = Paragraph::new(content)
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}
