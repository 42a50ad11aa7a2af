use chrono::{DateTime, Local, Utc};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::view_model::FeedState;

/// Draw the header bar with logo, feed host and refresh status
pub fn draw_header(frame: &mut Frame, area: Rect, feed_url: &str, state: &FeedState) {
  let domain = extract_domain(feed_url);

  let status = if state.is_loading {
    Span::styled(" loading... ", Style::default().fg(Color::Yellow))
  } else {
    Span::styled(
      format!(" {} templates ", state.items.len()),
      Style::default().fg(Color::White),
    )
  };

  let header = Line::from(vec![
    Span::styled(" feedgrid ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    status,
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", refreshed_label(state.last_refreshed)),
      Style::default().fg(Color::DarkGray),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn refreshed_label(last_refreshed: Option<DateTime<Utc>>) -> String {
  match last_refreshed {
    Some(at) => format!(
      "updated {}",
      at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ),
    None => "never updated".to_string(),
  }
}

/// Extract domain from the feed URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
