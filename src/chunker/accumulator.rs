//! Collects the slices of the chunk currently being built.

use bytes::{Bytes, BytesMut};

use crate::chunk::Chunk;

/// A run of bytes contributed to a chunk.
#[derive(Debug, Clone)]
pub enum Slice<'a> {
    /// Bytes the accumulator may keep past the current call.
    Owned(Bytes),
    /// A view into the caller's buffer, valid only for the current call.
    Borrowed(&'a [u8]),
}

impl Slice<'_> {
    /// Returns the number of bytes in the slice.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the slice has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes of the slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Slice::Owned(bytes) => bytes,
            Slice::Borrowed(bytes) => bytes,
        }
    }

    /// Converts into bytes that outlive the caller's buffer, copying a
    /// borrowed view.
    pub fn into_owned(self) -> Bytes {
        match self {
            Slice::Owned(bytes) => bytes,
            Slice::Borrowed(bytes) => Bytes::copy_from_slice(bytes),
        }
    }
}

/// Ordered slices of the pending chunk and their total length.
///
/// Pending slices are always owned. The slice that closes a chunk is
/// consumed by [`ChunkAccumulator::finalize_with`] before the caller's
/// buffer goes away, so it is read in place instead.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    slices: Vec<Bytes>,
    len: usize,
    offset: u64,
}

impl ChunkAccumulator {
    /// Creates an empty accumulator positioned at stream offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slice to the pending chunk, copying it if it is borrowed.
    pub fn add(&mut self, slice: Slice<'_>) {
        if slice.is_empty() {
            return;
        }
        let bytes = slice.into_owned();
        self.len += bytes.len();
        self.slices.push(bytes);
    }

    /// Closes the pending chunk with `closing` and returns it.
    ///
    /// The chunk is one fresh buffer sized exactly to the pending length plus
    /// `closing`. The accumulator is left empty.
    pub fn finalize_with(&mut self, closing: Slice<'_>) -> Chunk {
        let tail = closing.as_bytes();
        let total = self.len + tail.len();

        let mut data = BytesMut::with_capacity(total);
        for slice in self.slices.drain(..) {
            data.extend_from_slice(&slice);
        }
        data.extend_from_slice(tail);
        debug_assert_eq!(data.len(), total);

        let chunk = Chunk::new(data, self.offset);
        self.offset += total as u64;
        self.len = 0;
        chunk
    }

    /// Closes the pending chunk, or returns `None` if nothing is pending.
    pub fn finalize(&mut self) -> Option<Chunk> {
        if self.is_empty() {
            return None;
        }
        Some(self.finalize_with(Slice::Borrowed(&[])))
    }

    /// Whether no bytes are pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of pending bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the stream offset the next chunk will start at.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
