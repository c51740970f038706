//! Basic synchronous chunking example.
//!
//! Pushes a buffer through a `StreamChunker` in uneven pieces, then reads the
//! same bytes back through `ChunkIter` and checks both agree.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::Cursor;

use dedup_chunker::{ChunkIter, ChunkerConfig, StreamChunker};

fn main() -> Result<(), dedup_chunker::ChunkError> {
    let data: Vec<u8> = (0..300_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();

    let config = ChunkerConfig::new(
        2 * 1024,  // min: 2 KiB
        8 * 1024,  // avg: 8 KiB
        32 * 1024, // max: 32 KiB
    )?;

    let mut chunker = StreamChunker::new(config)?;
    let mut pushed = Vec::new();

    // Feed pieces of growing size, as a network socket might deliver them
    let mut offset = 0;
    let mut piece = 1;
    while offset < data.len() {
        let end = (offset + piece).min(data.len());
        pushed.extend(chunker.push(&data[offset..end])?);
        offset = end;
        piece = piece * 3 + 1;
    }
    pushed.extend(chunker.flush()?);

    for (i, chunk) in pushed.iter().enumerate() {
        println!("  Chunk {:>3}: offset={:>8}, len={:>6}", i, chunk.offset, chunk.len());
    }

    let read: Vec<_> = ChunkIter::new(Cursor::new(&data), config)?.collect::<Result<_, _>>()?;
    assert_eq!(read, pushed, "boundaries must not depend on how input is split");

    let total: usize = pushed.iter().map(|c| c.len()).sum();
    println!("\nTotal: {} chunks, {} bytes", pushed.len(), total);
    println!("Average chunk size: {} bytes", total / pushed.len().max(1));

    Ok(())
}
