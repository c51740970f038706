//! Blocking reader adapter.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use super::StreamChunker;
use crate::chunk::Chunk;
use crate::config::ChunkerConfig;
use crate::error::ChunkError;

/// Size of each read from the underlying reader.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// An iterator that yields chunks from a reader.
///
/// Reads up to 8 KiB at a time, pushes it through a [`StreamChunker`] and
/// flushes when the reader reports end of stream.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use dedup_chunker::{ChunkIter, ChunkerConfig};
///
/// let data = vec![3u8; 10_000];
/// let iter = ChunkIter::new(Cursor::new(&data), ChunkerConfig::new(64, 256, 1024)?)?;
///
/// let total: usize = iter.map(|chunk| chunk.map(|c| c.len())).sum::<Result<_, _>>()?;
/// assert_eq!(total, data.len());
/// # Ok::<(), dedup_chunker::ChunkError>(())
/// ```
pub struct ChunkIter<R> {
    reader: R,
    chunker: StreamChunker,
    buffer: Box<[u8]>,
    ready: VecDeque<Chunk>,
    finished: bool,
}

impl<R: Read> ChunkIter<R> {
    /// Creates a chunk iterator over `reader`.
    pub fn new(reader: R, config: ChunkerConfig) -> Result<Self, ChunkError> {
        Ok(Self {
            reader,
            chunker: StreamChunker::new(config)?,
            buffer: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            ready: VecDeque::new(),
            finished: false,
        })
    }

    /// Returns the stream offset of the next chunk to be read.
    pub fn offset(&self) -> u64 {
        self.ready
            .front()
            .map_or_else(|| self.chunker.offset(), |chunk| chunk.offset)
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }

            let produced = match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    self.chunker.flush()
                }
                Ok(n) => self.chunker.push(&self.buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            };

            match produced {
                Ok(chunks) => self.ready.extend(chunks),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 7 + 13) % 251) as u8).collect()
    }

    #[test]
    fn test_empty_reader() {
        let iter = ChunkIter::new(Cursor::new(Vec::new()), ChunkerConfig::default()).unwrap();
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn test_reconstructs_input() {
        let data = sample(50_000);
        let config = ChunkerConfig::new(64, 256, 1024).unwrap();
        let chunks: Vec<_> = ChunkIter::new(Cursor::new(&data), config)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data().to_vec()).collect();
        assert_eq!(joined, data);

        let mut expected = 0;
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected);
            expected += chunk.len() as u64;
        }
    }

    #[test]
    fn test_read_size_does_not_matter() {
        let data = sample(20_000);
        let config = ChunkerConfig::new(64, 256, 1024).unwrap();
        let ranges = |step| {
            ChunkIter::new(Trickle { data: &data, step }, config)
                .unwrap()
                .map(|c| c.unwrap().range())
                .collect::<Vec<_>>()
        };
        assert_eq!(ranges(1), ranges(8192));
        assert_eq!(ranges(333), ranges(8192));
    }
}
