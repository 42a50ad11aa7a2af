//! Feed repository: the only thing the presentation layer talks to.
//!
//! The cache is the single source of truth. `refresh()` writes into it and
//! `feed_items()` observes it; neither knows about the other.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::cache::{CacheStorage, FeedRow};

use super::client::{FeedSource, FetchError};
use super::types::FeedItem;

/// Why a refresh failed
#[derive(Debug, Error)]
pub enum RefreshError {
  #[error(transparent)]
  Fetch(#[from] FetchError),
  #[error("failed to write feed cache: {0}")]
  Storage(color_eyre::Report),
  #[error("cache writer task failed: {0}")]
  Worker(#[source] tokio::task::JoinError),
}

pub struct FeedRepository<S, C> {
  source: Arc<S>,
  cache: Arc<C>,
  thumbnail_prefix: String,
}

impl<S, C> Clone for FeedRepository<S, C> {
  fn clone(&self) -> Self {
    Self {
      source: Arc::clone(&self.source),
      cache: Arc::clone(&self.cache),
      thumbnail_prefix: self.thumbnail_prefix.clone(),
    }
  }
}

impl<S: FeedSource, C: CacheStorage + 'static> FeedRepository<S, C> {
  pub fn new(source: Arc<S>, cache: Arc<C>, thumbnail_prefix: impl Into<String>) -> Self {
    Self {
      source,
      cache,
      thumbnail_prefix: thumbnail_prefix.into(),
    }
  }

  /// Observe the cached feed as display items.
  pub fn feed_items(&self) -> FeedItemStream {
    FeedItemStream {
      rows: self.cache.subscribe(),
    }
  }

  /// Fetch the remote feed and write it to the cache.
  ///
  /// Returns how many new rows were stored. On a fetch error nothing is
  /// written. Concurrent calls are not serialized against each other.
  pub async fn refresh(&self) -> Result<usize, RefreshError> {
    let feed = self.source.fetch_feed().await?;
    let rows = feed.into_rows(&self.thumbnail_prefix);
    let offered = rows.len();

    let cache = Arc::clone(&self.cache);
    let inserted = tokio::task::spawn_blocking(move || cache.insert_all(&rows))
      .await
      .map_err(RefreshError::Worker)?
      .map_err(RefreshError::Storage)?;

    tracing::info!(offered, inserted, "feed refreshed");

    Ok(inserted)
  }

  pub fn cache(&self) -> &Arc<C> {
    &self.cache
  }
}

/// Cache-derived stream of display items.
///
/// Each emission is the full list, mapped one-to-one from the cached rows.
/// Dropping the stream ends the observation.
pub struct FeedItemStream {
  rows: watch::Receiver<Vec<FeedRow>>,
}

impl FeedItemStream {
  /// Latest list, marking it as seen.
  pub fn current(&mut self) -> Vec<FeedItem> {
    to_items(&self.rows.borrow_and_update())
  }

  /// Whether the cache has emitted since the last `current()`/`changed()`.
  pub fn has_changed(&self) -> bool {
    self.rows.has_changed().unwrap_or(false)
  }

  /// Wait for the next emission. `None` once the cache is gone.
  #[cfg(test)]
  pub async fn changed(&mut self) -> Option<Vec<FeedItem>> {
    self.rows.changed().await.ok()?;
    Some(self.current())
  }
}

fn to_items(rows: &[FeedRow]) -> Vec<FeedItem> {
  rows.iter().map(FeedItem::from).collect()
}
