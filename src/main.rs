mod app;
mod cache;
mod config;
mod event;
mod feed;
mod logging;
mod query;
mod ui;
mod view_model;

use cache::{CacheStorage, SqliteStorage};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use feed::{FeedClient, FeedItem, FeedRepository, FeedSource};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "feedgrid")]
#[command(about = "Browse a remote template feed in a terminal grid")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/feedgrid/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Path to the cache database (overrides the config file)
  #[arg(long)]
  cache: Option<PathBuf>,

  /// Empty the cache before starting
  #[arg(long)]
  clear_cache: bool,

  /// Refresh once, print cached items as JSON lines and exit
  #[arg(short, long)]
  list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init()?;

  let cache_path = match args.cache.or(config.cache.path.clone()) {
    Some(path) => path,
    None => SqliteStorage::default_path()?,
  };
  let cache = Arc::new(SqliteStorage::open(&cache_path)?);
  tracing::info!(path = %cache_path.display(), rows = cache.count()?, "cache opened");

  if args.clear_cache {
    cache.delete_all()?;
  }

  let client = FeedClient::new(&config.feed)?;
  let feed_url = client.endpoint().to_string();
  let repository = FeedRepository::new(Arc::new(client), cache, config.feed.thumbnail_prefix);

  if args.list {
    return list(&repository, &mut std::io::stdout().lock()).await;
  }

  let mut app = app::App::new(repository, feed_url, config.ui.columns);
  app.run().await?;

  Ok(())
}

/// Headless mode: one refresh, then dump whatever the cache holds.
///
/// A failed refresh still prints the cached items but fails the command.
async fn list<S, C, W>(repository: &FeedRepository<S, C>, out: &mut W) -> Result<()>
where
  S: FeedSource,
  C: CacheStorage + 'static,
  W: Write,
{
  let refreshed = repository.refresh().await;
  if let Err(e) = &refreshed {
    tracing::warn!(error = %e, "refresh failed");
  }

  for row in repository.cache().get_all()? {
    serde_json::to_writer(&mut *out, &FeedItem::from(&row))?;
    writeln!(out)?;
  }
  out.flush()?;

  refreshed
    .map(|_| ())
    .map_err(|e| eyre!("refresh failed, printed cached items only: {}", e))
}
