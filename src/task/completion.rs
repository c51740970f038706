//! Delivery of task results to the submitter.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::warn;

use crate::chunk::Chunk;
use crate::error::ChunkError;

/// What a task hands back: the chunks it closed, or why it failed.
pub type Outcome = Result<Vec<Chunk>, ChunkError>;

/// Continuation invoked with the outcome of a task.
pub type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

enum Target {
    Callback(Callback),
    Channel(oneshot::Sender<Outcome>),
}

impl Target {
    fn deliver(self, outcome: Outcome) {
        match self {
            Target::Callback(callback) => callback(outcome),
            Target::Channel(tx) => {
                // The receiver may have been dropped; nobody is waiting then.
                let _ = tx.send(outcome);
            }
        }
    }
}

/// Receives the outcome of a task exactly once.
///
/// A completion dropped before it was used delivers
/// [`ChunkError::Aborted`], so a submitter is never left waiting on a task
/// that died with its pool.
pub(crate) struct Completion {
    target: Option<Target>,
}

impl Completion {
    pub(crate) fn callback<F>(f: F) -> Self
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        Self {
            target: Some(Target::Callback(Box::new(f))),
        }
    }

    pub(crate) fn channel() -> (Self, PendingChunks) {
        let (tx, rx) = oneshot::channel();
        let completion = Self {
            target: Some(Target::Channel(tx)),
        };
        (completion, PendingChunks { rx })
    }

    pub(crate) fn complete(mut self, outcome: Outcome) {
        if let Some(target) = self.target.take() {
            target.deliver(outcome);
        }
    }

    /// Disarms the completion without delivering anything.
    pub(crate) fn cancel(mut self) {
        self.target = None;
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            warn!("chunking task dropped before completion");
            target.deliver(Err(ChunkError::Aborted));
        }
    }
}

/// The future outcome of a submitted push or flush.
///
/// Await it from async code, or call [`PendingChunks::wait`] from a thread
/// that is not driving an async runtime.
#[must_use = "the chunks are lost if the pending result is dropped"]
#[derive(Debug)]
pub struct PendingChunks {
    rx: oneshot::Receiver<Outcome>,
}

impl PendingChunks {
    /// Blocks the current thread until the task completes.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context;
    /// `.await` the value there instead.
    pub fn wait(self) -> Outcome {
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(ChunkError::Aborted))
    }

    /// Returns the outcome if the task has already completed.
    pub fn try_take(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(ChunkError::Aborted)),
        }
    }
}

impl Future for PendingChunks {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(ChunkError::Aborted)))
    }
}
