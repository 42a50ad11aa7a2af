//! Canned feed sources for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::api_types::{GetFeedResponse, TemplateMetadata};
use super::client::{FeedSource, FetchError};

pub const TEST_PREFIX: &str = "https://thumbs.test/";

pub fn template(id: &str, premium: bool) -> TemplateMetadata {
  TemplateMetadata {
    id: id.to_string(),
    template_thumbnail_uri: format!("{}.jpg", id),
    is_premium: premium,
    template_name: format!("{}.json", id),
    ..TemplateMetadata::default()
  }
}

pub fn response(ids: &[&str]) -> GetFeedResponse {
  GetFeedResponse {
    templates_metadata: ids.iter().map(|id| template(id, false)).collect(),
  }
}

/// Serves whatever response it currently holds; can be told to fail once.
pub struct MockFeedSource {
  response: Mutex<GetFeedResponse>,
  fail_next: AtomicBool,
  delay: Option<Duration>,
  calls: AtomicUsize,
}

impl MockFeedSource {
  pub fn new(response: GetFeedResponse) -> Self {
    Self {
      response: Mutex::new(response),
      fail_next: AtomicBool::new(false),
      delay: None,
      calls: AtomicUsize::new(0),
    }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn set_response(&self, response: GetFeedResponse) {
    *self.response.lock().unwrap() = response;
  }

  /// The next fetch fails with a parse error, later ones succeed again.
  pub fn fail_next(&self) {
    self.fail_next.store(true, Ordering::SeqCst);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl FeedSource for MockFeedSource {
  async fn fetch_feed(&self) -> Result<GetFeedResponse, FetchError> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    if self.fail_next.swap(false, Ordering::SeqCst) {
      let err = serde_json::from_str::<GetFeedResponse>("network unreachable").unwrap_err();
      return Err(FetchError::Parse(err));
    }

    Ok(self.response.lock().unwrap().clone())
  }
}
