use serde::Serialize;

use crate::cache::FeedRow;

/// A template as shown in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
  pub id: String,
  pub thumbnail_url: String,
  pub is_premium: bool,
}

impl From<&FeedRow> for FeedItem {
  fn from(row: &FeedRow) -> Self {
    Self {
      id: row.id.clone(),
      thumbnail_url: row.thumbnail_url.clone(),
      is_premium: row.is_premium,
    }
  }
}
