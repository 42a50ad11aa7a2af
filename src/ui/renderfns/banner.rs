use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Draw a transient error message over the bottom of `area`
pub fn draw_banner(frame: &mut Frame, area: Rect, message: &str) {
  let height = 3.min(area.height);
  let banner_area = Rect {
    x: area.x,
    y: area.y + area.height - height,
    width: area.width,
    height,
  };

  let paragraph = Paragraph::new(format!("Network error: {}", message))
    .style(Style::default().fg(Color::White).bg(Color::Red))
    .wrap(Wrap { trim: true })
    .block(
      Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::Red)),
    );

  frame.render_widget(Clear, banner_area);
  frame.render_widget(paragraph, banner_area);
}
