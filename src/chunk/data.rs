//! The Chunk type - a finished content-defined chunk.

use std::fmt;
use std::ops::Range;

use bytes::{Bytes, BytesMut};

/// A finished content-defined chunk.
///
/// The buffer is allocated fresh for every chunk and handed over by move:
/// the chunker keeps no reference to it, so the receiver may mutate it in
/// place or freeze it into [`Bytes`] without copying.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use dedup_chunker::Chunk;
///
/// let chunk = Chunk::new(BytesMut::from(&b"hello world"[..]), 100);
///
/// assert_eq!(chunk.len(), 11);
/// assert_eq!(chunk.range(), 100..111);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk data, exclusively owned.
    pub data: BytesMut,

    /// Position of the first byte of this chunk in its stream.
    pub offset: u64,
}

impl Chunk {
    /// Creates a chunk starting at `offset`.
    pub fn new(data: BytesMut, offset: u64) -> Self {
        Self { data, offset }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the chunk data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the chunk data for in-place modification.
    pub fn data_mut(&mut self) -> &mut BytesMut {
        &mut self.data
    }

    /// Returns the stream offset of the first byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of stream offsets.
    pub fn range(&self) -> Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying buffer.
    pub fn into_data(self) -> BytesMut {
        self.data
    }

    /// Consumes the chunk and returns its data as immutable [`Bytes`].
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes @ {})", self.len(), self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(data: &[u8], offset: u64) -> Chunk {
        Chunk::new(BytesMut::from(data), offset)
    }

    #[test]
    fn test_new() {
        let chunk = chunk(b"hello", 0);
        assert_eq!(chunk.len(), 5);
        assert!(!chunk.is_empty());
        assert_eq!(chunk.data(), b"hello");
    }

    #[test]
    fn test_range() {
        let chunk = chunk(b"hello", 100);
        assert_eq!(chunk.offset(), 100);
        assert_eq!(chunk.end(), 105);
        assert_eq!(chunk.range(), 100..105);
    }

    #[test]
    fn test_mutate_in_place() {
        let mut chunk = chunk(b"hello", 0);
        chunk.data_mut()[0] = b'j';
        assert_eq!(chunk.data(), b"jello");
    }

    #[test]
    fn test_freeze_keeps_allocation() {
        let chunk = chunk(b"hello", 0);
        let ptr = chunk.data.as_ptr();
        let frozen = chunk.freeze();
        assert_eq!(frozen.as_ptr(), ptr);
        assert_eq!(&frozen[..], b"hello");
    }

    #[test]
    fn test_display() {
        let s = chunk(b"hello", 100).to_string();
        assert!(s.contains("5 bytes"));
        assert!(s.contains("@ 100"));
    }
}
