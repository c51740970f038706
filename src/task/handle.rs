//! Per-stream serial lanes on top of a shared [`WorkerPool`].

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::{Completion, Operation, Outcome, PendingChunks, Task};
use crate::cdc::{ConfiguredHash, RollingHash};
use crate::chunker::{ChunkerState, StreamChunker};
use crate::config::ChunkerConfig;
use crate::error::ChunkError;
use crate::pool::WorkerPool;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

// Admission of a drain job, shared between the submitter and the job.
const PENDING: u8 = 0;
const ACCEPTED: u8 = 1;
const RUNNING: u8 = 2;
const DROPPED: u8 = 3;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct LaneQueue {
    tasks: VecDeque<Task>,
    // Invariant: when false, `tasks` is empty and no drain job exists.
    scheduled: bool,
}

struct Lane<H> {
    id: u64,
    queue: Mutex<LaneQueue>,
    chunker: Mutex<StreamChunker<H>>,
}

impl<H: RollingHash> Lane<H> {
    /// Runs queued tasks in submission order until the queue is empty.
    fn drain(&self) {
        loop {
            let task = {
                let mut queue = lock(&self.queue);
                match queue.tasks.pop_front() {
                    Some(task) => task,
                    None => {
                        queue.scheduled = false;
                        return;
                    }
                }
            };

            trace!(stream = self.id, task = task.name(), "running task");
            let finished = {
                let mut chunker = lock(&self.chunker);
                task.run(&mut *chunker)
            };
            finished.on_complete();
        }
    }

    /// Aborts everything queued after the drain job was lost.
    fn abandon(&self) {
        let tasks = {
            let mut queue = lock(&self.queue);
            queue.scheduled = false;
            mem::take(&mut queue.tasks)
        };
        if !tasks.is_empty() {
            warn!(stream = self.id, aborted = tasks.len(), "drain job lost, aborting queued tasks");
        }
        drop(tasks);
    }
}

/// Drains one lane on a pool thread.
///
/// If the job is dropped unfinished, either by the pool or by a panic while
/// draining, the lane is abandoned so no queued task waits forever.
struct DrainJob<H: RollingHash> {
    lane: Arc<Lane<H>>,
    admission: Arc<AtomicU8>,
    finished: bool,
}

impl<H: RollingHash> DrainJob<H> {
    fn run(mut self) {
        self.admission.store(RUNNING, Ordering::SeqCst);
        // The unwind stops here on every pool; `drop` then abandons the lane.
        match panic::catch_unwind(AssertUnwindSafe(|| self.lane.drain())) {
            Ok(()) => self.finished = true,
            Err(_) => warn!(stream = self.lane.id, "task panicked while draining stream"),
        }
    }
}

impl<H: RollingHash> Drop for DrainJob<H> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Still pending: the submitter has not seen the pool's answer and
        // cleans up itself.
        if self
            .admission
            .compare_exchange(PENDING, DROPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.lane.abandon();
        }
    }
}

/// Submits push and flush tasks for one stream to a shared worker pool.
///
/// Tasks for the same stream run one at a time, in submission order, each
/// holding the stream exclusively for its whole duration. Tasks for
/// different streams run in parallel on whatever threads the pool has.
///
/// Cloning a handle yields another submitter for the same stream.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dedup_chunker::{ChunkerConfig, ChunkerHandle, RayonPool};
///
/// let pool = Arc::new(RayonPool::new(2)?);
/// let stream = ChunkerHandle::new(ChunkerConfig::default(), pool)?;
///
/// let first = stream.push(vec![0u8; 100_000])?;
/// let last = stream.flush()?;
///
/// let mut total = 0;
/// for chunk in first.wait()?.into_iter().chain(last.wait()?) {
///     total += chunk.len();
/// }
/// assert_eq!(total, 100_000);
/// # Ok::<(), dedup_chunker::ChunkError>(())
/// ```
pub struct ChunkerHandle<H = ConfiguredHash> {
    lane: Arc<Lane<H>>,
    pool: Arc<dyn WorkerPool>,
}

impl ChunkerHandle<ConfiguredHash> {
    /// Opens a stream for `config` whose tasks run on `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` does not validate.
    pub fn new<P>(config: ChunkerConfig, pool: P) -> Result<Self, ChunkError>
    where
        P: WorkerPool + 'static,
    {
        Ok(Self::from_chunker(StreamChunker::new(config)?, pool))
    }
}

impl<H: RollingHash + 'static> ChunkerHandle<H> {
    /// Binds an existing stream to `pool`.
    pub fn from_chunker<P>(chunker: StreamChunker<H>, pool: P) -> Self
    where
        P: WorkerPool + 'static,
    {
        let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
        debug!(stream = id, "stream bound to worker pool");
        Self {
            lane: Arc::new(Lane {
                id,
                queue: Mutex::new(LaneQueue::default()),
                chunker: Mutex::new(chunker),
            }),
            pool: Arc::new(pool),
        }
    }

    /// Enqueues a push of `data`; `on_complete` receives the chunks it closed.
    ///
    /// `on_complete` runs on the worker thread right after the task. A push
    /// after a flush completes with [`ChunkError::InvalidState`] and no
    /// chunks. Borrowed input must be copied into [`Bytes`] by the caller,
    /// for instance with [`Bytes::copy_from_slice`].
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::PoolUnavailable`] if the pool refused the work.
    /// The task is not enqueued and `on_complete` is never called.
    pub fn submit_push<F>(&self, data: impl Into<Bytes>, on_complete: F) -> Result<(), ChunkError>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let operation = Operation::Push(data.into());
        self.enqueue(Task::new(operation, Completion::callback(on_complete)))
    }

    /// Enqueues a flush; `on_complete` receives zero or one final chunk.
    ///
    /// # Errors
    ///
    /// Same as [`ChunkerHandle::submit_push`].
    pub fn submit_flush<F>(&self, on_complete: F) -> Result<(), ChunkError>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.enqueue(Task::new(Operation::Flush, Completion::callback(on_complete)))
    }

    /// Enqueues a push of `data` and returns its pending outcome.
    pub fn push(&self, data: impl Into<Bytes>) -> Result<PendingChunks, ChunkError> {
        let (completion, pending) = Completion::channel();
        self.enqueue(Task::new(Operation::Push(data.into()), completion))?;
        Ok(pending)
    }

    /// Enqueues a flush and returns its pending outcome.
    pub fn flush(&self) -> Result<PendingChunks, ChunkError> {
        let (completion, pending) = Completion::channel();
        self.enqueue(Task::new(Operation::Flush, completion))?;
        Ok(pending)
    }

    fn enqueue(&self, task: Task) -> Result<(), ChunkError> {
        let name = task.name();
        {
            let mut queue = lock(&self.lane.queue);
            queue.tasks.push_back(task);
            if queue.scheduled {
                trace!(stream = self.lane.id, task = name, queued = queue.tasks.len(), "task queued");
                return Ok(());
            }
            queue.scheduled = true;
        }

        // The queue lock is released before submitting, so pools that run
        // jobs inline on this thread work too.
        let admission = Arc::new(AtomicU8::new(PENDING));
        let job = DrainJob {
            lane: Arc::clone(&self.lane),
            admission: Arc::clone(&admission),
            finished: false,
        };

        match self.pool.submit(Box::new(move || job.run())) {
            Ok(()) => {
                let previous =
                    admission.compare_exchange(PENDING, ACCEPTED, Ordering::SeqCst, Ordering::SeqCst);
                if previous == Err(DROPPED) {
                    // Accepted, then dropped before it could run.
                    self.lane.abandon();
                }
                trace!(stream = self.lane.id, task = name, "drain job scheduled");
                Ok(())
            }
            Err(err) => {
                // Nothing drained, so our task is still at the front. Tasks
                // queued behind it meanwhile have no drain job either.
                let (ours, stranded) = {
                    let mut queue = lock(&self.lane.queue);
                    queue.scheduled = false;
                    let ours = queue.tasks.pop_front();
                    (ours, mem::take(&mut queue.tasks))
                };
                if let Some(task) = ours {
                    task.discard();
                }
                warn!(
                    stream = self.lane.id,
                    task = name,
                    aborted = stranded.len(),
                    error = %err,
                    "worker pool refused task"
                );
                drop(stranded);
                Err(err)
            }
        }
    }

    /// Returns the process-unique id of this stream, as used in log events.
    pub fn id(&self) -> u64 {
        self.lane.id
    }

    /// Returns the number of tasks waiting to run.
    pub fn queued(&self) -> usize {
        lock(&self.lane.queue).tasks.len()
    }

    /// Returns the lifecycle state of the stream.
    ///
    /// Blocks while a task for this stream is running.
    pub fn state(&self) -> ChunkerState {
        lock(&self.lane.chunker).state()
    }
}

impl<H> Clone for ChunkerHandle<H> {
    fn clone(&self) -> Self {
        Self {
            lane: Arc::clone(&self.lane),
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<H> fmt::Debug for ChunkerHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkerHandle")
            .field("stream", &self.lane.id)
            .finish_non_exhaustive()
    }
}
