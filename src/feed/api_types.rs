//! Serde-deserializable types matching the feed endpoint's response.
//!
//! These types are separate from cache and display types: the endpoint sends
//! far more per template than the grid needs.

use serde::{Deserialize, Serialize};

use crate::cache::FeedRow;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetFeedResponse {
  pub templates_metadata: Vec<TemplateMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
  pub id: String,
  #[serde(rename = "templateThumbnailURI")]
  pub template_thumbnail_uri: String,
  pub is_premium: bool,
  #[serde(default)]
  pub is_new: bool,
  #[serde(default)]
  pub template_name: String,
  #[serde(default)]
  pub template_categories: Vec<String>,
  #[serde(default)]
  pub configuration: String,
}

impl TemplateMetadata {
  /// Project onto a cache row; the relative thumbnail path is appended to
  /// `thumbnail_prefix` verbatim.
  pub fn into_row(self, thumbnail_prefix: &str) -> FeedRow {
    FeedRow {
      thumbnail_url: format!("{}{}", thumbnail_prefix, self.template_thumbnail_uri),
      id: self.id,
      is_premium: self.is_premium,
    }
  }
}

impl GetFeedResponse {
  pub fn into_rows(self, thumbnail_prefix: &str) -> Vec<FeedRow> {
    self
      .templates_metadata
      .into_iter()
      .map(|t| t.into_row(thumbnail_prefix))
      .collect()
  }
}
