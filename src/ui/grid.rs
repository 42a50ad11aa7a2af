use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::feed::FeedItem;
use crate::ui::renderfns::{premium_badge, thumbnail_name, truncate};

/// Height of one grid cell including borders
pub const CELL_HEIGHT: u16 = 5;

/// Selection and scroll position within the grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridState {
  selected: Option<usize>,
  /// First visible row
  offset: usize,
}

impl GridState {
  pub fn selected(&self) -> Option<usize> {
    self.selected
  }

  #[cfg(test)]
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Keep the selection inside `0..len`, selecting the first cell when
  /// items appear and clearing the selection when they disappear.
  pub fn clamp(&mut self, len: usize) {
    self.selected = match (self.selected, len) {
      (_, 0) => None,
      (None, _) => Some(0),
      (Some(i), len) => Some(i.min(len - 1)),
    };
    if self.selected.is_none() {
      self.offset = 0;
    }
  }

  /// Move by `dx` cells within a row and `dy` rows. Horizontal moves wrap
  /// onto the neighbouring row; both stop at the grid's ends.
  pub fn move_by(&mut self, dx: isize, dy: isize, len: usize, columns: usize) {
    if len == 0 {
      self.selected = None;
      return;
    }
    let columns = columns.max(1) as isize;
    let current = self.selected.unwrap_or(0) as isize;
    let target = current + dx + dy * columns;

    // A vertical move past the end lands on the last item only if the
    // target row exists at all
    let last = len as isize - 1;
    let next = if target < 0 {
      if dy < 0 { current } else { 0 }
    } else if target > last {
      if dy > 0 && target / columns > last / columns {
        current
      } else {
        last
      }
    } else {
      target
    };
    self.selected = Some(next as usize);
  }

  /// Scroll so the selected row is within `visible_rows` rows from `offset`.
  pub fn scroll_to_selected(&mut self, columns: usize, visible_rows: usize) {
    let Some(selected) = self.selected else {
      self.offset = 0;
      return;
    };
    let row = selected / columns.max(1);
    let visible_rows = visible_rows.max(1);

    if row < self.offset {
      self.offset = row;
    } else if row >= self.offset + visible_rows {
      self.offset = row + 1 - visible_rows;
    }
  }
}

/// Draw the items as a grid of `columns` cells per row
pub fn draw_grid(
  frame: &mut Frame,
  area: Rect,
  items: &[FeedItem],
  columns: usize,
  state: &mut GridState,
) {
  let columns = columns.max(1);
  let visible_rows = (area.height / CELL_HEIGHT).max(1) as usize;

  state.clamp(items.len());
  state.scroll_to_selected(columns, visible_rows);

  let row_areas = Layout::default()
    .direction(Direction::Vertical)
    .constraints(vec![Constraint::Length(CELL_HEIGHT); visible_rows])
    .split(area);

  let column_constraints = vec![Constraint::Ratio(1, columns as u32); columns];

  for (row_idx, row_area) in row_areas.iter().enumerate() {
    let first = (state.offset + row_idx) * columns;
    if first >= items.len() {
      break;
    }

    let cells = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(column_constraints.clone())
      .split(*row_area);

    for (col, cell_area) in cells.iter().enumerate() {
      let index = first + col;
      if let Some(item) = items.get(index) {
        draw_cell(frame, *cell_area, item, state.selected == Some(index));
      }
    }
  }
}

fn draw_cell(frame: &mut Frame, area: Rect, item: &FeedItem, selected: bool) {
  let border_color = if selected { Color::Cyan } else { Color::DarkGray };
  let width = area.width.saturating_sub(2) as usize;

  let block = Block::default()
    .title(format!(" {} ", truncate(&item.id, width.saturating_sub(2))))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border_color));

  let lines = vec![
    Line::from(Span::styled(
      truncate(thumbnail_name(&item.thumbnail_url), width),
      Style::default().fg(Color::White),
    )),
    Line::from(Span::styled(
      truncate(&item.thumbnail_url, width),
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(premium_badge(item.is_premium)),
  ];

  let style = if selected {
    Style::default().add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };

  frame.render_widget(Paragraph::new(lines).style(style).block(block), area);
}
