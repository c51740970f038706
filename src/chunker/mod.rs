//! Chunking engine for processing byte streams.
//!
//! - [`StreamChunker`] - Stateful CDC engine with `push()`/`flush()` API
//! - [`ChunkAccumulator`] - Pending slices of the chunk being built
//! - [`ChunkIter`] - Iterator over the chunks of a [`std::io::Read`] source

mod accumulator;
mod engine;
mod iter;

pub use accumulator::{ChunkAccumulator, Slice};
pub use engine::{ChunkerState, StreamChunker};
pub use iter::ChunkIter;
