/*!
 * Bounded worker pool for per-unit pipeline runs.
 *
 * Each task is spawned on the tokio runtime so units make progress in
 * parallel. At most `workers` tasks are in flight; results are handed back
 * in submission order once every task has finished, one slot per item.
 */

use std::future::Future;

use futures::stream::{self, StreamExt};
use log::error;

/// Upper bound of the default pool size
const MAX_DEFAULT_WORKERS: usize = 32;

/// Default pool size: `min(32, cpus + 4)`
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    MAX_DEFAULT_WORKERS.min(cpus + 4)
}

/// Bounded pool created for one document
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_worker_count())
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every item and return the results in item order
    ///
    /// `on_complete` is called with `(index, completed_so_far)` as tasks
    /// finish, in completion order. A task that panics is logged and its
    /// slot is `None`, so callers can substitute a fallback at that index.
    pub async fn run_ordered<T, R, F, Fut, C>(&self, items: Vec<T>, task: F, mut on_complete: C) -> Vec<Option<R>>
    where
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
        C: FnMut(usize, usize),
    {
        let total = items.len();
        let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
        let mut completed = 0;

        let mut results = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let handle = tokio::spawn(task(index, item));
                async move { (index, handle.await) }
            })
            .buffer_unordered(self.workers);

        while let Some((index, result)) = results.next().await {
            completed += 1;
            match result {
                Ok(value) => slots[index] = Some(value),
                Err(e) => error!("Task {} of {} did not complete: {}", index + 1, total, e),
            }
            on_complete(index, completed);
        }

        slots
    }
}
