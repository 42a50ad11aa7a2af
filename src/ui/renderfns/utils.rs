use ratatui::prelude::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Last path segment of a thumbnail URL, ignoring any query string
pub fn thumbnail_name(url: &str) -> &str {
  let path = url.split(['?', '#']).next().unwrap_or(url);
  path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}

/// Badge shown on premium templates
pub fn premium_badge(is_premium: bool) -> Span<'static> {
  if is_premium {
    Span::styled("★ premium", Style::default().fg(Color::Yellow).bold())
  } else {
    Span::styled("free", Style::default().fg(Color::DarkGray))
  }
}
