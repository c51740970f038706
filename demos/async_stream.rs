//! Async chunking example.
//!
//! Writes a file with tokio, then chunks it through `chunk_async` using the
//! `tokio_util::compat` adapter.
//!
//! Run with:
//!     cargo run --example async_stream --features async-io

use futures_util::StreamExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

use dedup_chunker::{ChunkerConfig, chunk_async};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("dedup-chunker-demo.bin");
    let data: Vec<u8> = (0..1_000_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 11) as u8).collect();
    tokio::fs::write(&path, &data).await?;

    let file = tokio::fs::File::open(&path).await?;
    let mut stream = chunk_async(file.compat(), ChunkerConfig::default())?;

    let mut total_chunks = 0;
    let mut total_bytes = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total_chunks += 1;
        total_bytes += chunk.len();
        println!("  {chunk}");
    }

    tokio::fs::remove_file(&path).await?;

    println!("\nTotal: {} chunks, {} bytes", total_chunks, total_bytes);
    if total_chunks > 0 {
        println!("Average chunk size: {} bytes", total_bytes / total_chunks);
    }

    Ok(())
}
