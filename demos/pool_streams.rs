//! Many streams on one worker pool.
//!
//! Each stream gets a `ChunkerHandle`; its pushes run on the shared rayon
//! pool one at a time and in order, while different streams run in parallel.
//!
//! Run with:
//!     cargo run --example pool_streams

use std::sync::Arc;
use std::sync::mpsc;

use dedup_chunker::{ChunkerConfig, ChunkerHandle, RayonPool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pool = Arc::new(RayonPool::new(4)?);
    let config = ChunkerConfig::default();

    let inputs: Vec<Vec<u8>> = (0..6u32)
        .map(|s| (0..400_000u32).map(|i| ((i ^ s).wrapping_mul(0x9e37_79b1) >> 19) as u8).collect())
        .collect();

    let streams = inputs
        .iter()
        .map(|_| ChunkerHandle::new(config, Arc::clone(&pool)))
        .collect::<Result<Vec<_>, _>>()?;

    println!("Processing {} streams on {} threads...\n", streams.len(), pool.threads());

    // Completions arrive on pool threads; forward them here
    let (tx, rx) = mpsc::channel();
    for (input, stream) in inputs.iter().zip(&streams) {
        for batch in input.chunks(64 * 1024) {
            let tx = tx.clone();
            let id = stream.id();
            stream.submit_push(batch.to_vec(), move |outcome| {
                let _ = tx.send((id, outcome));
            })?;
        }
        let tx = tx.clone();
        let id = stream.id();
        stream.submit_flush(move |outcome| {
            let _ = tx.send((id, outcome));
        })?;
    }
    drop(tx);

    let mut per_stream = std::collections::BTreeMap::new();
    for (id, outcome) in rx {
        let chunks = outcome?;
        let entry = per_stream.entry(id).or_insert((0usize, 0usize));
        entry.0 += chunks.len();
        entry.1 += chunks.iter().map(|c| c.len()).sum::<usize>();
    }

    for (id, (chunks, bytes)) in per_stream {
        println!("Stream {id}: {chunks} chunks, {bytes} bytes");
    }

    Ok(())
}
