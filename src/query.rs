//! Background operation with observable state, polled from the UI loop.
//!
//! A `Query<T>` runs its fetcher on the tokio runtime and hands the result
//! back through a channel. Nothing about the result is applied until the
//! owner calls `poll()`, so all state changes happen on the thread that owns
//! the query (the UI loop), never on a worker.
//!
//! # Example
//!
//! ```ignore
//! let repo = repository.clone();
//! let mut query = Query::new(move || {
//!     let repo = repo.clone();
//!     async move { repo.refresh().await.map_err(|e| e.to_string()) }
//! });
//!
//! query.refetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // Settled, trigger re-render
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently running
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Async operation with loading/success/error state.
///
/// At most one run is in flight; dropping the query aborts it.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `refetch()` starts a run.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || fetcher().boxed()),
      receiver: None,
      task: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Start a fresh run, aborting any pending one. The aborted run's result
  /// is never observed.
  pub fn refetch(&mut self) {
    self.cancel();
    self.start();
  }

  /// Apply a finished run's result, if there is one.
  ///
  /// Returns `true` when the query settled during this call.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      // Task ended without reporting (panicked)
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Query was cancelled".to_string()),
    };

    self.state = match result {
      Ok(data) => QueryState::Success(data),
      Err(error) => QueryState::Error(error),
    };
    self.receiver = None;
    self.task = None;
    true
  }

  fn start(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    self.task = Some(tokio::spawn(async move {
      // Receiver may have been dropped
      let _ = tx.send(future.await);
    }));
  }

  fn cancel(&mut self) {
    self.receiver = None;
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T> Drop for Query<T> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("in_flight", &self.task.is_some())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
impl<T> QueryState<T> {
  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert_eq!(query.state(), &QueryState::Idle);
    assert!(!query.poll());

    query.refetch();
    assert_eq!(query.state(), &QueryState::Loading);

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.state().data(), Some(&vec![1, 2, 3]));

    // Already settled
    assert!(!query.poll());
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Something went wrong".to_string()) });

    query.refetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.state().error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_refetch_supersedes_pending() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let n = counter_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(n)
      }
    });

    query.refetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(query.poll());
    // Only the second run's result is observed
    assert_eq!(query.state().data(), Some(&1));
  }

  #[tokio::test]
  async fn test_drop_aborts_in_flight_run() {
    let finished = Arc::new(AtomicU32::new(0));
    let finished_clone = finished.clone();

    let mut query = Query::new(move || {
      let finished = finished_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        finished.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(())
      }
    });

    query.refetch();
    drop(query);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(finished.load(Ordering::SeqCst), 0);
  }
}
