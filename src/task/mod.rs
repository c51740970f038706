//! Push and flush work for a stream, run off the calling thread.
//!
//! - [`ChunkerHandle`] - submits tasks for one stream, in order
//! - [`PendingChunks`] - the outcome of a submitted task

mod completion;
mod handle;

use bytes::Bytes;

pub use completion::{Callback, Outcome, PendingChunks};
pub use handle::ChunkerHandle;

pub(crate) use completion::Completion;

use crate::cdc::RollingHash;
use crate::chunker::StreamChunker;

pub(crate) enum Operation {
    Push(Bytes),
    Flush,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Push(_) => "push",
            Operation::Flush => "flush",
        }
    }
}

/// One push or flush waiting for its stream.
pub(crate) struct Task {
    operation: Operation,
    completion: Completion,
}

impl Task {
    pub(crate) fn new(operation: Operation, completion: Completion) -> Self {
        Self {
            operation,
            completion,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.operation.name()
    }

    /// Runs the operation against `chunker`.
    ///
    /// The outcome is returned rather than delivered so the caller can
    /// release the stream before the completion runs.
    pub(crate) fn run<H: RollingHash>(self, chunker: &mut StreamChunker<H>) -> Finished {
        let outcome = match self.operation {
            Operation::Push(data) => chunker.push_bytes(data),
            Operation::Flush => chunker.flush(),
        };
        Finished {
            completion: self.completion,
            outcome,
        }
    }

    /// Drops the task without notifying its completion.
    pub(crate) fn discard(self) {
        self.completion.cancel();
    }
}

/// A task whose body has run but whose completion has not.
pub(crate) struct Finished {
    completion: Completion,
    outcome: Outcome,
}

impl Finished {
    pub(crate) fn on_complete(self) {
        self.completion.complete(self.outcome);
    }
}
