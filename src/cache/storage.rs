//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;

use super::FeedRow;

/// Trait for feed cache backends.
///
/// Every write re-publishes the full row set to subscribers, so an observer
/// always sees the latest committed state.
pub trait CacheStorage: Send + Sync {
  /// Insert rows in one transaction. Rows whose id already exists are ignored
  /// (first write wins). Returns the number of rows actually inserted.
  fn insert_all(&self, rows: &[FeedRow]) -> Result<usize>;

  /// Observe the full row set, in insertion order.
  fn subscribe(&self) -> watch::Receiver<Vec<FeedRow>>;

  /// Snapshot of the full row set, in insertion order.
  fn get_all(&self) -> Result<Vec<FeedRow>>;

  /// Number of cached rows. Blocks on the connection.
  fn count(&self) -> Result<usize>;

  /// Remove every row.
  fn delete_all(&self) -> Result<()>;

  /// When the most recent row was first written, if any.
  fn last_cached_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
  rows_tx: watch::Sender<Vec<FeedRow>>,
}

impl SqliteStorage {
  /// Open or create the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open a private in-memory cache. Nothing survives the process.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    let initial = query_all(&conn)?;
    let (rows_tx, _) = watch::channel(initial);

    Ok(Self {
      conn: Mutex::new(conn),
      rows_tx,
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("feedgrid").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Re-read the table and push it to every subscriber.
  ///
  /// Must be called with the connection lock held so that publications are
  /// ordered the same way as the writes that caused them.
  fn publish(&self, conn: &Connection) -> Result<()> {
    let rows = query_all(conn)?;
    self.rows_tx.send_replace(rows);
    Ok(())
  }
}

/// Schema for the feed cache.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS feed (
    id TEXT PRIMARY KEY NOT NULL,
    thumbnail_url TEXT NOT NULL,
    is_premium INTEGER NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

fn query_all(conn: &Connection) -> Result<Vec<FeedRow>> {
  let mut stmt = conn
    .prepare("SELECT id, thumbnail_url, is_premium FROM feed ORDER BY rowid")
    .map_err(|e| eyre!("Failed to prepare feed query: {}", e))?;

  let rows = stmt
    .query_map([], |row| {
      Ok(FeedRow {
        id: row.get(0)?,
        thumbnail_url: row.get(1)?,
        is_premium: row.get(2)?,
      })
    })
    .map_err(|e| eyre!("Failed to query feed: {}", e))?
    .collect::<rusqlite::Result<Vec<_>>>()
    .map_err(|e| eyre!("Failed to read feed row: {}", e))?;

  Ok(rows)
}

impl CacheStorage for SqliteStorage {
  fn insert_all(&self, rows: &[FeedRow]) -> Result<usize> {
    let mut conn = self.lock()?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    let mut inserted = 0;
    {
      let mut stmt = tx
        .prepare(
          "INSERT OR IGNORE INTO feed (id, thumbnail_url, is_premium, cached_at)
           VALUES (?, ?, ?, datetime('now'))",
        )
        .map_err(|e| eyre!("Failed to prepare insert: {}", e))?;

      for row in rows {
        inserted += stmt
          .execute(params![row.id, row.thumbnail_url, row.is_premium])
          .map_err(|e| eyre!("Failed to store row {}: {}", row.id, e))?;
      }
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    tracing::debug!(offered = rows.len(), inserted, "feed rows written");

    self.publish(&conn)?;
    Ok(inserted)
  }

  fn subscribe(&self) -> watch::Receiver<Vec<FeedRow>> {
    self.rows_tx.subscribe()
  }

  fn get_all(&self) -> Result<Vec<FeedRow>> {
    let conn = self.lock()?;
    query_all(&conn)
  }

  fn count(&self) -> Result<usize> {
    let conn = self.lock()?;

    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM feed", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count feed rows: {}", e))?;

    Ok(count as usize)
  }

  fn delete_all(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM feed", [])
      .map_err(|e| eyre!("Failed to clear feed cache: {}", e))?;

    tracing::info!("feed cache cleared");

    self.publish(&conn)
  }

  fn last_cached_at(&self) -> Result<Option<DateTime<Utc>>> {
    let conn = self.lock()?;

    let latest: Option<String> = conn
      .query_row("SELECT MAX(cached_at) FROM feed", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to read cache timestamp: {}", e))?;

    latest.as_deref().map(parse_datetime).transpose()
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
