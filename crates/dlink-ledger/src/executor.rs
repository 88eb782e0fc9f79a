use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Runs blocking ledger calls away from the async scheduler.
///
/// Whatever `op` returns, including an `Err` value, reaches the awaiter
/// unchanged. Only failures of the executor itself become [`ExecutorError`].
#[async_trait]
pub trait BlockingExecutor: Send + Sync + 'static {
    async fn run<F, T>(&self, op: F) -> Result<T, ExecutorError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}

/// Tokio blocking-pool executor with a bounded number of concurrent workers.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl WorkerPool {
    /// Pool allowing `max_workers` concurrent blocking calls (at least one).
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Workers not currently running a call.
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl BlockingExecutor for WorkerPool {
    async fn run<F, T>(&self, op: F) -> Result<T, ExecutorError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ExecutorError::Closed)?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            op()
        })
        .await
        .map_err(|e| {
            if e.is_panic() {
                ExecutorError::Panicked(panic_message(e.into_panic()))
            } else {
                ExecutorError::Cancelled
            }
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".into()
    }
}

/// Failures of the executor itself, as opposed to failures of the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("blocking call panicked: {0}")]
    Panicked(String),

    #[error("blocking call was cancelled")]
    Cancelled,

    #[error("executor is shut down")]
    Closed,
}
