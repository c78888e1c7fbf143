//! Bounded fire-and-forget task pool.
//!
//! `submit` enqueues a named fallible future without blocking the caller; a
//! dispatcher drains the queue and spawns each task under a semaphore that
//! caps concurrency. Errors are caught at the task boundary and logged --
//! nothing is ever returned to the submitter, and there is no cancellation:
//! an accepted task runs to completion or failure.
//!
//! When the queue is full the submission is dropped with a warning. Memory
//! extraction is best-effort personalization; it must never apply
//! backpressure to the chat path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

struct NamedTask {
    name: String,
    fut: TaskFuture,
}

/// Handle to the background task pool. Cheap to clone.
#[derive(Clone)]
pub struct TaskPool {
    tx: mpsc::Sender<NamedTask>,
}

impl TaskPool {
    /// Start a pool with a queue of `queue_capacity` pending tasks and at
    /// most `max_concurrent` tasks running at once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(queue_capacity: usize, max_concurrent: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<NamedTask>(queue_capacity.max(1));
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    // Semaphore is never closed while the dispatcher runs.
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    match task.fut.await {
                        Ok(()) => {
                            tracing::debug!(task = %task.name, "Background task completed");
                        }
                        Err(e) => {
                            tracing::error!(task = %task.name, error = %e, "Background task failed");
                        }
                    }
                    drop(permit);
                });
            }
        });

        Self { tx }
    }

    /// Enqueue a task and return immediately.
    ///
    /// The task's error (if any) is logged by the pool. A full queue drops
    /// the submission with a warning.
    pub fn submit<F>(&self, name: impl Into<String>, fut: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let task = NamedTask {
            name: name.into(),
            fut: Box::pin(fut),
        };
        if let Err(e) = self.tx.try_send(task) {
            let name = match &e {
                mpsc::error::TrySendError::Full(task) => task.name.clone(),
                mpsc::error::TrySendError::Closed(task) => task.name.clone(),
            };
            tracing::warn!(task = %name, "Task queue unavailable; submission dropped");
        }
    }
}
