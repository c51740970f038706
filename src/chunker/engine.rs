//! Core chunking engine - StreamChunker with streaming push/flush API.
//!
//! - `push()` - feed data in any size (1 byte, 8KB, 1MB, etc.)
//! - `flush()` - close whatever is pending when the stream ends
//!
//! # Example
//!
//! ```
//! use dedup_chunker::{ChunkerConfig, StreamChunker};
//!
//! let mut chunker = StreamChunker::new(ChunkerConfig::new(64, 256, 1024)?)?;
//!
//! let mut chunks = chunker.push(&[7u8; 3000])?;
//! chunks.extend(chunker.flush()?);
//!
//! assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 3000);
//! assert!(chunker.push(b"late").is_err());
//! # Ok::<(), dedup_chunker::ChunkError>(())
//! ```

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

use super::accumulator::{ChunkAccumulator, Slice};
use crate::cdc::{ConfiguredHash, RollingBoundaryDetector, RollingHash};
use crate::chunk::Chunk;
use crate::config::ChunkerConfig;
use crate::error::ChunkError;

/// Lifecycle of a [`StreamChunker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkerState {
    /// Accepting pushes.
    Active,
    /// Terminal. Every further push or flush fails.
    Flushed,
}

impl fmt::Display for ChunkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkerState::Active => f.write_str("active"),
            ChunkerState::Flushed => f.write_str("flushed"),
        }
    }
}

/// Splits one byte stream into content-defined chunks.
///
/// # Determinism
///
/// Identical byte streams produce identical chunk boundaries, regardless of
/// how many bytes are pushed at once or how many `push()` calls it takes.
///
/// # Ownership
///
/// Every returned [`Chunk`] owns a freshly allocated buffer. Bytes that do
/// not yet end a chunk are kept internally: copied when pushed through
/// [`StreamChunker::push`], shared without copying when pushed as [`Bytes`]
/// through [`StreamChunker::push_bytes`].
///
/// A `StreamChunker` has no internal locking. Use
/// [`ChunkerHandle`](crate::ChunkerHandle) to drive one from a worker pool.
#[derive(Debug)]
pub struct StreamChunker<H = ConfiguredHash> {
    config: ChunkerConfig,
    detector: RollingBoundaryDetector<H>,
    accumulator: ChunkAccumulator,
    state: ChunkerState,
}

impl StreamChunker<ConfiguredHash> {
    /// Opens a stream with the hash family selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: ChunkerConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::build(config, ConfiguredHash::from_config(&config)))
    }
}

impl<H: RollingHash> StreamChunker<H> {
    /// Opens a stream that finds natural boundaries with a custom `hash`.
    ///
    /// The size bounds still come from `config`.
    pub fn with_hash(config: ChunkerConfig, hash: H) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::build(config, hash))
    }

    fn build(config: ChunkerConfig, hash: H) -> Self {
        debug!(
            min = config.min_size(),
            avg = config.avg_size(),
            max = config.max_size(),
            algorithm = ?config.algorithm(),
            "opening chunk stream"
        );
        Self {
            detector: RollingBoundaryDetector::new(hash, config.min_size(), config.max_size()),
            accumulator: ChunkAccumulator::new(),
            state: ChunkerState::Active,
            config,
        }
    }

    /// Pushes a borrowed buffer and returns the chunks it completed.
    ///
    /// Bytes after the last boundary are copied, since `data` is only
    /// borrowed for this call. An empty `data` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidState`] after [`StreamChunker::flush`].
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Chunk>, ChunkError> {
        self.feed(data, None)
    }

    /// Pushes an owned buffer and returns the chunks it completed.
    ///
    /// Bytes after the last boundary are retained as a slice of `data`
    /// instead of being copied.
    pub fn push_bytes(&mut self, data: Bytes) -> Result<Vec<Chunk>, ChunkError> {
        self.feed(&data, Some(&data))
    }

    fn feed(&mut self, data: &[u8], owner: Option<&Bytes>) -> Result<Vec<Chunk>, ChunkError> {
        self.ensure_active("push")?;

        let mut chunks = Vec::new();
        let mut cursor = 0;

        while cursor < data.len() {
            let rest = &data[cursor..];
            match self.detector.push(rest) {
                Some(offset) => {
                    let chunk = self.accumulator.finalize_with(Slice::Borrowed(&rest[..offset]));
                    trace!(
                        offset = chunk.offset,
                        len = chunk.len(),
                        forced = self.detector.last_boundary_forced(),
                        "chunk boundary"
                    );
                    chunks.push(chunk);
                    cursor += offset;
                }
                None => {
                    let pending = match owner {
                        Some(bytes) => Slice::Owned(bytes.slice(cursor..)),
                        None => Slice::Borrowed(rest),
                    };
                    self.accumulator.add(pending);
                    cursor = data.len();
                }
            }
        }

        debug_assert_eq!(self.accumulator.len(), self.detector.bytes_since_boundary());
        trace!(
            pushed = data.len(),
            chunks = chunks.len(),
            pending = self.accumulator.len(),
            "push"
        );
        Ok(chunks)
    }

    /// Ends the stream, closing any pending bytes into one final chunk.
    ///
    /// The final chunk may be shorter than `min_size`. Nothing is returned if
    /// no bytes are pending. The stream is [`ChunkerState::Flushed`]
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidState`] if the stream was already flushed.
    pub fn flush(&mut self) -> Result<Vec<Chunk>, ChunkError> {
        self.ensure_active("flush")?;
        self.state = ChunkerState::Flushed;

        let chunk = self.accumulator.finalize();
        debug!(
            offset = self.accumulator.offset(),
            tail = chunk.as_ref().map_or(0, Chunk::len),
            "flushed chunk stream"
        );
        Ok(chunk.into_iter().collect())
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), ChunkError> {
        match self.state {
            ChunkerState::Active => Ok(()),
            state => Err(ChunkError::InvalidState { operation, state }),
        }
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> ChunkerState {
        self.state
    }

    /// Returns the stream offset of the next chunk to be emitted.
    pub fn offset(&self) -> u64 {
        self.accumulator.offset()
    }

    /// Returns the number of bytes waiting for a boundary.
    pub fn pending_len(&self) -> usize {
        self.accumulator.len()
    }

    /// Returns the configuration used by this stream.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}
