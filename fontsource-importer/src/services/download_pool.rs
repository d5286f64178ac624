//! Bounded worker pool for asset transfers
//!
//! One pool is built at startup and shared (via `Arc`) by every import, so
//! the ceiling holds across concurrent imports. Each call to
//! [`DownloadPool::run_all`] is one batch: if any job in the batch fails, the
//! batch's queued jobs are dropped without running and its in-flight jobs
//! are aborted. Other batches sharing the pool are unaffected.

use fontsource_common::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub struct DownloadPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl DownloadPool {
    /// Create a pool allowing at most `capacity` jobs in flight
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("download pool capacity must be at least 1".to_string()));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently holding a slot, across all batches
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Run a batch of jobs, returning their outputs in completion order
    ///
    /// Jobs are lazy futures; none starts before it is admitted to the pool.
    /// The first failure cancels the batch and is returned.
    pub async fn run_all<T, Fut, I>(&self, jobs: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for job in jobs {
            let permits = Arc::clone(&self.permits);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    permit = permits.acquire_owned() => permit.ok()?,
                };
                // Admitted after a sibling failed
                if cancel.is_cancelled() {
                    return None;
                }

                let result = job.await;
                if result.is_err() {
                    // Cancel while still holding the slot so no queued sibling starts
                    cancel.cancel();
                }
                Some(result)
            });
        }

        let mut outputs = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(Ok(output))) => outputs.push(output),
                Ok(Some(Err(e))) => {
                    cancel.cancel();
                    tasks.abort_all();
                    tracing::warn!(error = %e, "Download batch failed, remaining jobs dropped");
                    return Err(e);
                }
                Ok(None) => {}
                Err(join_error) => {
                    cancel.cancel();
                    tasks.abort_all();
                    return Err(Error::Internal(format!("download task failed: {}", join_error)));
                }
            }
        }

        Ok(outputs)
    }
}
