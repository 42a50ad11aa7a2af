use crate::config::FeedConfig;
use crate::feed::api_types::GetFeedResponse;
use color_eyre::{eyre::eyre, Result};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a feed fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request to {url} failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("{url} answered with status {status}")]
  Status {
    url: String,
    status: reqwest::StatusCode,
  },
  #[error("failed to parse feed: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Anything that can produce the remote feed.
///
/// `FeedClient` is the real one; tests substitute canned sources.
pub trait FeedSource: Send + Sync + 'static {
  fn fetch_feed(&self) -> impl Future<Output = Result<GetFeedResponse, FetchError>> + Send;
}

/// HTTP client for the template feed endpoint
#[derive(Clone)]
pub struct FeedClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl FeedClient {
  pub fn new(config: &FeedConfig) -> Result<Self> {
    let endpoint = config.endpoint()?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("feedgrid/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, endpoint })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }
}

impl FeedSource for FeedClient {
  /// One GET, no retry.
  async fn fetch_feed(&self) -> Result<GetFeedResponse, FetchError> {
    let url = self.endpoint.to_string();
    tracing::debug!(%url, "fetching feed");

    let transport = |source: reqwest::Error| FetchError::Transport {
      url: url.clone(),
      source,
    };

    let response = self
      .http
      .get(self.endpoint.clone())
      .send()
      .await
      .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.clone(),
        status,
      });
    }

    let body = response.bytes().await.map_err(transport)?;
    let feed: GetFeedResponse = serde_json::from_slice(&body)?;

    tracing::info!(
      templates = feed.templates_metadata.len(),
      "feed fetched"
    );

    Ok(feed)
  }
}
