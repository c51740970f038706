//! Chunk types.
//!
//! - [`Chunk`] - an owned, contiguous content-defined chunk and its stream offset

mod data;

pub use data::Chunk;
