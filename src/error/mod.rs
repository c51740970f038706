//! Error types for dedup-chunker.

use thiserror::Error;

use crate::chunker::ChunkerState;

/// Errors that can occur while configuring, submitting or running chunking work.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChunkError {
    /// An I/O error occurred while reading input data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A call at the host boundary was malformed. Reported synchronously,
    /// nothing is enqueued.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// Description of what was wrong with the call.
        message: String,
    },

    /// The stream is not in a state that accepts the operation.
    #[error("invalid state: cannot {operation} a {state} stream")]
    InvalidState {
        /// The rejected operation (`"push"` or `"flush"`).
        operation: &'static str,
        /// The state the stream was in.
        state: ChunkerState,
    },

    /// The worker pool refused to accept a job.
    #[error("worker pool unavailable: {message}")]
    PoolUnavailable {
        /// Why the job was refused.
        message: String,
    },

    /// The task was dropped before it could complete.
    #[error("task aborted before completion")]
    Aborted,
}

impl ChunkError {
    /// Returns true for [`ChunkError::InvalidState`].
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ChunkError::InvalidState { .. })
    }
}
