//! Presentation state for the feed grid.
//!
//! `FeedViewModel` turns the repository's cache stream and refresh results
//! into the flags the view renders: the item list, `is_loading`, `is_empty`
//! and a one-shot error message. Results from background work are applied
//! only in `tick()`, which the UI loop calls.

mod one_shot;

pub use one_shot::OneShot;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::CacheStorage;
use crate::feed::{FeedItem, FeedItemStream, FeedRepository, FeedSource};
use crate::query::{Query, QueryState};

pub type ErrorEvent = Option<Arc<OneShot<String>>>;

/// Everything the view needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
  pub items: Vec<FeedItem>,
  pub is_loading: bool,
  pub is_empty: bool,
  pub last_refreshed: Option<DateTime<Utc>>,
}

pub struct FeedViewModel {
  refresh: Query<usize>,
  stream: FeedItemStream,
  /// Whether the stream's initial value has been applied
  primed: bool,
  items: watch::Sender<Vec<FeedItem>>,
  is_loading: watch::Sender<bool>,
  is_empty: watch::Sender<bool>,
  error_event: watch::Sender<ErrorEvent>,
  last_refreshed: Option<DateTime<Utc>>,
}

impl FeedViewModel {
  /// Create the view model and start the initial refresh.
  ///
  /// Must be called inside a tokio runtime.
  pub fn new<S: FeedSource, C: CacheStorage + 'static>(repository: FeedRepository<S, C>) -> Self {
    let repo = repository.clone();
    let refresh = Query::new(move || {
      let repo = repo.clone();
      async move { repo.refresh().await.map_err(|e| e.to_string()) }
    });

    let last_refreshed = match repository.cache().last_cached_at() {
      Ok(at) => at,
      Err(e) => {
        tracing::warn!(error = %e, "could not read cache timestamp");
        None
      }
    };

    let mut view_model = Self {
      stream: repository.feed_items(),
      refresh,
      primed: false,
      items: watch::Sender::new(Vec::new()),
      is_loading: watch::Sender::new(true),
      is_empty: watch::Sender::new(true),
      error_event: watch::Sender::new(None),
      last_refreshed,
    };
    view_model.refresh();
    view_model
  }

  /// Start a refresh. A refresh already in flight is superseded.
  pub fn refresh(&mut self) {
    tracing::debug!("refresh requested");
    self.is_loading.send_replace(true);
    self.refresh.refetch();
  }

  /// Apply pending refresh results and cache emissions.
  ///
  /// Returns `true` if any observable changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;

    // Poll first: a refresh publishes its rows before it reports back
    if self.refresh.poll() {
      self.is_loading.send_replace(false);
      match self.refresh.state() {
        QueryState::Success(inserted) => {
          tracing::info!(inserted, "refresh complete");
          self.last_refreshed = Some(Utc::now());
        }
        QueryState::Error(message) => {
          tracing::warn!(error = %message, "refresh failed");
          self
            .error_event
            .send_replace(Some(Arc::new(OneShot::new(message.clone()))));
        }
        QueryState::Idle | QueryState::Loading => {}
      }
      changed = true;
    }

    if !self.primed || self.stream.has_changed() {
      self.primed = true;
      let items = self.stream.current();
      self.is_empty.send_replace(items.is_empty());
      self.items.send_replace(items);
      changed = true;
    }

    changed
  }

  pub fn items(&self) -> watch::Receiver<Vec<FeedItem>> {
    self.items.subscribe()
  }

  #[allow(dead_code)]
  pub fn is_loading(&self) -> watch::Receiver<bool> {
    self.is_loading.subscribe()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> watch::Receiver<bool> {
    self.is_empty.subscribe()
  }

  /// Observe error events. Each event can be taken by one observer only.
  pub fn error_events(&self) -> watch::Receiver<ErrorEvent> {
    self.error_event.subscribe()
  }

  /// Take the latest error message if no observer has handled it yet.
  #[cfg(test)]
  pub fn take_error(&self) -> Option<String> {
    self.error_event.borrow().as_ref().and_then(|event| event.take())
  }

  pub fn snapshot(&self) -> FeedState {
    FeedState {
      items: self.items.borrow().clone(),
      is_loading: *self.is_loading.borrow(),
      is_empty: *self.is_empty.borrow(),
      last_refreshed: self.last_refreshed,
    }
  }
}
