use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const SHORTCUTS: &[(&str, &str)] = &[
  ("<r>", "refresh"),
  ("<hjkl>", "move"),
  ("<esc>", "dismiss"),
  ("<q>", "quit"),
];

/// Draw the footer bar with key hints and the selected position
pub fn draw_footer(frame: &mut Frame, area: Rect, selected: Option<usize>, total: usize) {
  let mut spans = vec![Span::raw(" ")];

  for (i, (key, label)) in SHORTCUTS.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}", label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  if let Some(selected) = selected {
    spans.push(Span::styled(
      format!("   {}/{}", selected + 1, total),
      Style::default().fg(Color::White),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
