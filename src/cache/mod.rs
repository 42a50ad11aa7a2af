//! Local feed cache.
//!
//! A single SQLite table keyed by item id that:
//! - Accepts bulk inserts where an existing id is never overwritten
//! - Publishes the full row set to observers after every write
//! - Is the only persisted state; everything shown on screen derives from it

mod storage;

pub use storage::{CacheStorage, SqliteStorage};

/// One cached feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRow {
  pub id: String,
  pub thumbnail_url: String,
  pub is_premium: bool,
}
