use crate::cache::CacheStorage;
use crate::event::{Event, EventHandler};
use crate::feed::{FeedItem, FeedRepository, FeedSource};
use crate::ui::{self, grid::GridState, grid::CELL_HEIGHT, Screen};
use crate::view_model::{ErrorEvent, FeedViewModel};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// How long an error banner stays up unless dismissed
const BANNER_TTL: Duration = Duration::from_secs(4);

/// Rows the grid shows when the terminal size is unknown
const DEFAULT_VISIBLE_ROWS: usize = 4;

struct Banner {
  message: String,
  shown_at: Instant,
}

/// Main application state
pub struct App {
  view_model: FeedViewModel,
  items: watch::Receiver<Vec<FeedItem>>,
  errors: watch::Receiver<ErrorEvent>,
  grid: GridState,
  columns: usize,
  visible_rows: usize,
  feed_url: String,
  banner: Option<Banner>,
  should_quit: bool,
}

impl App {
  /// Build the app; the initial refresh starts right away.
  pub fn new<S: FeedSource, C: CacheStorage + 'static>(
    repository: FeedRepository<S, C>,
    feed_url: String,
    columns: usize,
  ) -> Self {
    let view_model = FeedViewModel::new(repository);
    Self {
      items: view_model.items(),
      errors: view_model.error_events(),
      view_model,
      grid: GridState::default(),
      columns: columns.max(1),
      visible_rows: DEFAULT_VISIBLE_ROWS,
      feed_url,
      banner: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      let size = terminal.size()?;
      // header, footer and the grid's border
      self.visible_rows = (size.height.saturating_sub(4) / CELL_HEIGHT).max(1) as usize;

      let state = self.view_model.snapshot();
      let screen = Screen {
        feed_url: &self.feed_url,
        columns: self.columns,
        banner: self.banner.as_ref().map(|b| b.message.as_str()),
      };
      terminal.draw(|frame| ui::draw(frame, &screen, &state, &mut self.grid))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    tracing::info!("quitting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {}
      Event::Tick => self.on_tick(),
    }
  }

  fn on_tick(&mut self) {
    self.view_model.tick();

    if self.items.has_changed().unwrap_or(false) {
      let len = self.items.borrow_and_update().len();
      self.grid.clamp(len);
    }

    if self.errors.has_changed().unwrap_or(false) {
      let message = self
        .errors
        .borrow_and_update()
        .as_ref()
        .and_then(|event| event.take());
      if let Some(message) = message {
        self.banner = Some(Banner {
          message,
          shown_at: Instant::now(),
        });
      }
    }

    if self
      .banner
      .as_ref()
      .is_some_and(|b| b.shown_at.elapsed() >= BANNER_TTL)
    {
      self.banner = None;
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    let len = self.items.borrow().len();

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      KeyCode::Char('r') => self.view_model.refresh(),
      KeyCode::Esc => self.banner = None,

      KeyCode::Left | KeyCode::Char('h') => self.grid.move_by(-1, 0, len, self.columns),
      KeyCode::Right | KeyCode::Char('l') => self.grid.move_by(1, 0, len, self.columns),
      KeyCode::Up | KeyCode::Char('k') => self.grid.move_by(0, -1, len, self.columns),
      KeyCode::Down | KeyCode::Char('j') => self.grid.move_by(0, 1, len, self.columns),
      KeyCode::PageUp => {
        let rows = self.visible_rows as isize;
        self.grid.move_by(0, -rows, len, self.columns);
      }
      KeyCode::PageDown => {
        let rows = self.visible_rows as isize;
        self.grid.move_by(0, rows, len, self.columns);
      }
      KeyCode::Home | KeyCode::Char('g') => self.grid.move_by(-(len as isize), 0, len, self.columns),
      KeyCode::End | KeyCode::Char('G') => self.grid.move_by(len as isize, 0, len, self.columns),

      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::SqliteStorage;
  use crate::feed::testing::{response, MockFeedSource, TEST_PREFIX};
  use std::sync::Arc;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app(source: MockFeedSource) -> (Arc<MockFeedSource>, App) {
    let source = Arc::new(source);
    let cache = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let repo = FeedRepository::new(Arc::clone(&source), cache, TEST_PREFIX);
    (source, App::new(repo, "https://thumbs.test/feed.json".to_string(), 2))
  }

  async fn settle(app: &mut App) {
    for _ in 0..400 {
      app.on_tick();
      if !app.view_model.snapshot().is_loading {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("refresh did not settle");
  }

  #[tokio::test]
  async fn test_navigation_after_load() {
    let (_source, mut app) = app(MockFeedSource::new(response(&["a", "b", "c", "d"])));
    settle(&mut app).await;

    assert_eq!(app.grid.selected(), Some(0));

    app.handle_key(key(KeyCode::Char('l')));
    app.handle_key(key(KeyCode::Char('j')));
    assert_eq!(app.grid.selected(), Some(3));

    app.handle_key(key(KeyCode::Char('g')));
    assert_eq!(app.grid.selected(), Some(0));

    app.handle_key(key(KeyCode::End));
    assert_eq!(app.grid.selected(), Some(3));
  }

  #[tokio::test]
  async fn test_error_shows_banner_until_dismissed() {
    let source = MockFeedSource::new(response(&["a"]));
    source.fail_next();
    let (_source, mut app) = app(source);
    settle(&mut app).await;

    assert!(app.banner.is_some());

    app.handle_key(key(KeyCode::Esc));
    assert!(app.banner.is_none());

    // The event was consumed; later ticks do not bring it back
    app.on_tick();
    assert!(app.banner.is_none());
  }

  #[tokio::test]
  async fn test_r_refreshes() {
    let (source, mut app) = app(MockFeedSource::new(response(&["a"])));
    settle(&mut app).await;

    source.set_response(response(&["a", "b"]));
    app.handle_key(key(KeyCode::Char('r')));
    assert!(app.view_model.snapshot().is_loading);
    settle(&mut app).await;

    assert_eq!(source.calls(), 2);
    assert_eq!(app.view_model.snapshot().items.len(), 2);
  }

  #[tokio::test]
  async fn test_quit_keys() {
    let (_source, mut app) = app(MockFeedSource::new(response(&[])));
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);

    let (_source, mut app) = self::app(MockFeedSource::new(response(&[])));
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }
}
