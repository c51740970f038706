//! Worker pool backed by a dedicated rayon thread pool.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use super::{Job, WorkerPool};
use crate::error::ChunkError;

/// A fixed-size rayon thread pool reserved for chunking.
#[derive(Debug)]
pub struct RayonPool {
    pool: ThreadPool,
}

impl RayonPool {
    /// Builds a pool with `threads` worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidArguments`] if `threads` is zero and
    /// [`ChunkError::PoolUnavailable`] if the threads cannot be spawned.
    pub fn new(threads: usize) -> Result<Self, ChunkError> {
        if threads == 0 {
            return Err(ChunkError::InvalidArguments {
                message: "worker pool needs at least one thread".to_string(),
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dedup-chunker-{i}"))
            .panic_handler(|_| warn!("job panicked on chunking pool"))
            .build()
            .map_err(|e| ChunkError::PoolUnavailable {
                message: e.to_string(),
            })?;

        debug!(threads, "started rayon chunking pool");
        Ok(Self { pool })
    }

    /// Returns the number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl WorkerPool for RayonPool {
    fn submit(&self, job: Job) -> Result<(), ChunkError> {
        self.pool.spawn(job);
        Ok(())
    }
}
