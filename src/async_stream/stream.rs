//! Async stream adapter for chunking.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::chunk::Chunk;
use crate::chunker::StreamChunker;
use crate::config::ChunkerConfig;
use crate::error::ChunkError;

const READ_BUFFER_SIZE: usize = 8 * 1024;

pin_project! {
    /// A stream that yields chunks from an async reader.
    ///
    /// Chunks are identical to what [`StreamChunker`] produces for the same
    /// bytes, however the reader splits its reads.
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        chunker: StreamChunker,
        buffer: Box<[u8]>,
        ready: VecDeque<Chunk>,
        finished: bool,
    }
}

impl<R> ChunkStream<R> {
    /// Returns the stream offset of the next chunk to be produced.
    pub fn offset(&self) -> u64 {
        self.ready
            .front()
            .map_or_else(|| self.chunker.offset(), |chunk| chunk.offset)
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<Chunk, ChunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(chunk) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            let n = match this.reader.as_mut().poll_read(cx, this.buffer) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(ChunkError::Io(e))));
                }
                Poll::Ready(Ok(n)) => n,
            };

            let chunks = if n == 0 {
                *this.finished = true;
                this.chunker.flush()
            } else {
                this.chunker.push(&this.buffer[..n])
            };
            match chunks {
                Ok(chunks) => this.ready.extend(chunks),
                Err(e) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

/// Creates a chunk stream from an async reader.
///
/// Uses `futures_io::AsyncRead`, so any runtime works. Tokio readers can be
/// adapted with `tokio_util::compat::TokioAsyncReadCompatExt::compat`.
///
/// ```ignore
/// use dedup_chunker::{chunk_async, ChunkerConfig};
/// use futures_util::StreamExt;
/// use tokio_util::compat::TokioAsyncReadCompatExt;
///
/// let file = tokio::fs::File::open("data.bin").await?;
/// let mut stream = chunk_async(file.compat(), ChunkerConfig::default())?;
///
/// while let Some(chunk) = stream.next().await {
///     println!("{}", chunk?);
/// }
/// ```
///
/// # Errors
///
/// Returns [`ChunkError::InvalidConfig`] if `config` does not validate.
/// Read failures are yielded by the stream and end it.
pub fn chunk_async<R: AsyncRead>(reader: R, config: ChunkerConfig) -> Result<ChunkStream<R>, ChunkError> {
    Ok(ChunkStream {
        reader,
        chunker: StreamChunker::new(config)?,
        buffer: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
        ready: VecDeque::new(),
        finished: false,
    })
}
