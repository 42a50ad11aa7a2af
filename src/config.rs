use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://assets.swishvideoapp.com/";
pub const DEFAULT_FEED_PATH: &str = "Android/demo/feed.json";
pub const DEFAULT_THUMBNAIL_PREFIX: &str =
  "https://assets.swishvideoapp.com/Android/demo/catalog/thumbnails/";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub feed: FeedConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
  /// Host the feed is served from
  pub base_url: String,
  /// Feed path relative to `base_url`
  pub path: String,
  /// Prepended to every template's relative thumbnail path
  pub thumbnail_prefix: String,
  /// Whole-request timeout
  pub timeout_secs: u64,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      path: DEFAULT_FEED_PATH.to_string(),
      thumbnail_prefix: DEFAULT_THUMBNAIL_PREFIX.to_string(),
      timeout_secs: 30,
    }
  }
}

impl FeedConfig {
  /// Full URL of the feed document.
  pub fn endpoint(&self) -> Result<Url> {
    let base = Url::parse(&self.base_url)
      .map_err(|e| eyre!("Invalid feed base_url {:?}: {}", self.base_url, e))?;

    base
      .join(&self.path)
      .map_err(|e| eyre!("Invalid feed path {:?}: {}", self.path, e))
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Cache database location (defaults to the platform data directory)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
  /// Grid columns
  pub columns: usize,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self { columns: 2 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./feedgrid.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/feedgrid/config.yaml
  ///
  /// With no file found the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config.validate()
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("feedgrid.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("feedgrid").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }

    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  fn validate(mut self) -> Result<Self> {
    self.feed.endpoint()?;
    self.ui.columns = self.ui.columns.max(1);
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default().validate().unwrap();

    assert_eq!(
      config.feed.endpoint().unwrap().as_str(),
      "https://assets.swishvideoapp.com/Android/demo/feed.json"
    );
    assert_eq!(config.feed.thumbnail_prefix, DEFAULT_THUMBNAIL_PREFIX);
    assert_eq!(config.ui.columns, 2);
    assert!(config.cache.path.is_none());
  }

  #[test]
  fn test_partial_yaml_keeps_other_defaults() {
    let config = Config::parse(
      r#"
feed:
  base_url: http://localhost:8080/
  timeout_secs: 5
ui:
  columns: 4
"#,
    )
    .unwrap();

    assert_eq!(config.feed.base_url, "http://localhost:8080/");
    assert_eq!(config.feed.path, DEFAULT_FEED_PATH);
    assert_eq!(config.feed.timeout_secs, 5);
    assert_eq!(config.ui.columns, 4);
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.feed.base_url, DEFAULT_BASE_URL);
  }

  #[test]
  fn test_invalid_base_url_rejected() {
    let config = Config::parse("feed:\n  base_url: not a url\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_zero_columns_clamped() {
    let config = Config::parse("ui:\n  columns: 0\n").unwrap().validate().unwrap();
    assert_eq!(config.ui.columns, 1);
  }

  #[test]
  fn test_load_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedgrid.yaml");
    std::fs::write(&path, "cache:\n  path: /tmp/feedgrid-test.db\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(
      config.cache.path.as_deref(),
      Some(Path::new("/tmp/feedgrid-test.db"))
    );
  }

  #[test]
  fn test_load_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/feedgrid.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
