//! Worker pool backed by tokio's blocking thread pool.

use tokio::runtime::Handle;

use super::{Job, WorkerPool};
use crate::error::ChunkError;

/// Runs jobs with [`Handle::spawn_blocking`].
///
/// Jobs still queued when the runtime shuts down are dropped; their tasks
/// complete with [`ChunkError::Aborted`].
#[derive(Debug, Clone)]
pub struct TokioPool {
    handle: Handle,
}

impl TokioPool {
    /// Uses the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidArguments`] outside of a tokio runtime.
    pub fn current() -> Result<Self, ChunkError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ChunkError::InvalidArguments {
                message: e.to_string(),
            })
    }
}

impl WorkerPool for TokioPool {
    fn submit(&self, job: Job) -> Result<(), ChunkError> {
        // Detached: completion is reported by the task itself.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_outside_runtime() {
        assert!(matches!(
            TokioPool::current(),
            Err(ChunkError::InvalidArguments { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runs_job() {
        let pool = TokioPool::current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        pool.submit(Box::new(move || {
            let _ = tx.send(42);
        }))
        .unwrap();
        assert_eq!(rx.await.unwrap(), 42);
    }
}
