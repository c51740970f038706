//! dedup-chunker
//!
//! Streaming Content-Defined Chunking (CDC) for deduplication pipelines.
//!
//! A byte stream arrives in buffers of any size; `dedup-chunker` cuts it into
//! chunks whose boundaries depend only on content, so the same bytes always
//! produce the same chunks no matter how they were split on the way in.
//!
//! - [`StreamChunker`] - the single-threaded `push()`/`flush()` engine
//! - [`ChunkerHandle`] - the same engine driven by a [`WorkerPool`], one
//!   task at a time per stream, many streams in parallel
//! - [`ChunkIter`] and `chunk_async` - adapters over readers
//!
//! The crate does not hash, store or index chunks.
//!
//! # Sync
//!
//! ```
//! use dedup_chunker::{ChunkerConfig, StreamChunker};
//!
//! let mut chunker = StreamChunker::new(ChunkerConfig::default())?;
//!
//! let mut chunks = Vec::new();
//! for buf in [&[1u8; 50_000][..], &[2u8; 70_000][..]] {
//!     chunks.extend(chunker.push(buf)?);
//! }
//! chunks.extend(chunker.flush()?);
//!
//! assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 120_000);
//! # Ok::<(), dedup_chunker::ChunkError>(())
//! ```
//!
//! # Worker pool
//!
//! ```
//! use std::sync::Arc;
//! use dedup_chunker::{ChunkerConfig, ChunkerHandle, RayonPool};
//!
//! let pool = Arc::new(RayonPool::new(4)?);
//! let streams: Vec<_> = (0..3)
//!     .map(|_| ChunkerHandle::new(ChunkerConfig::default(), Arc::clone(&pool)))
//!     .collect::<Result<_, _>>()?;
//!
//! for stream in &streams {
//!     stream.submit_push(vec![0u8; 10_000], |outcome| {
//!         let chunks = outcome.expect("stream is active");
//!         assert!(chunks.is_empty());
//!     })?;
//! }
//! for stream in &streams {
//!     let tail = stream.flush()?.wait()?;
//!     assert_eq!(tail[0].len(), 10_000);
//! }
//! # Ok::<(), dedup_chunker::ChunkError>(())
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use dedup_chunker::{chunk_async, ChunkerConfig};
//!
//! async fn demo<R: futures_io::AsyncRead>(reader: R) -> Result<(), dedup_chunker::ChunkError> {
//!     let mut stream = Box::pin(chunk_async(reader, ChunkerConfig::default())?);
//!
//!     while let Some(chunk) = stream.next().await {
//!         println!("chunk {}", chunk?.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cdc;
mod chunk;
mod chunker;
mod config;
mod error;
mod pool;
mod task;

#[cfg(feature = "async-io")]
mod async_stream;

pub use cdc::{Buzhash, ConfiguredHash, Gear, RollingBoundaryDetector, RollingHash};
pub use chunk::Chunk;
pub use chunker::{ChunkAccumulator, ChunkIter, ChunkerState, Slice, StreamChunker};
pub use config::{
    Algorithm, ChunkerConfig, DEFAULT_AVG_CHUNK_SIZE, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE,
    DEFAULT_NORMALIZATION_LEVEL, DEFAULT_WINDOW_SIZE, MAX_MASK_BITS, MAX_WINDOW_SIZE,
};
pub use error::ChunkError;
pub use pool::{Job, RayonPool, TokioPool, WorkerPool};
pub use task::{Callback, ChunkerHandle, Outcome, PendingChunks};

#[cfg(feature = "async-io")]
pub use async_stream::{ChunkStream, chunk_async};
