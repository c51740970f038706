//! Worker pools that run chunking tasks off the calling thread.
//!
//! - [`WorkerPool`] - what the chunking layer needs from a pool
//! - [`RayonPool`] - a dedicated rayon thread pool
//! - [`TokioPool`] - the blocking pool of a tokio runtime

mod rayon_pool;
mod tokio_pool;

use std::sync::Arc;

pub use rayon_pool::RayonPool;
pub use tokio_pool::TokioPool;

use crate::error::ChunkError;

/// A unit of work handed to a pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs on worker threads.
///
/// A pool makes no ordering promises. Jobs that must not overlap are
/// serialized above it, see [`ChunkerHandle`](crate::ChunkerHandle).
pub trait WorkerPool: Send + Sync {
    /// Schedules `job` to run on some worker thread.
    ///
    /// On error the job has been dropped without running.
    fn submit(&self, job: Job) -> Result<(), ChunkError>;
}

impl<P: WorkerPool + ?Sized> WorkerPool for Arc<P> {
    fn submit(&self, job: Job) -> Result<(), ChunkError> {
        (**self).submit(job)
    }
}

impl<P: WorkerPool + ?Sized> WorkerPool for &P {
    fn submit(&self, job: Job) -> Result<(), ChunkError> {
        (**self).submit(job)
    }
}
