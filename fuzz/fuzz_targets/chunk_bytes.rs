#![no_main]

use libfuzzer_sys::fuzz_target;
use dedup_chunker::{Algorithm, ChunkerConfig, StreamChunker};

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        // Small chunks
        ChunkerConfig::new(4, 16, 64).unwrap(),
        // Medium chunks, windowed hash
        ChunkerConfig::new(64, 256, 1024)
            .unwrap()
            .with_algorithm(Algorithm::Buzhash)
            .with_window_size(16),
        // Large chunks
        ChunkerConfig::new(256, 4096, 16384).unwrap(),
        // Default config
        ChunkerConfig::default(),
    ];

    for config in configs {
        let mut chunker = StreamChunker::new(config).unwrap();
        let mut chunks = chunker.push(&data).unwrap();
        chunks.extend(chunker.flush().unwrap());

        // Verify: all chunks are within min/max bounds
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.is_empty());
            assert!(chunk.len() <= config.max_size());
            // Only the last chunk may be shorter than min_size
            if i < chunks.len() - 1 {
                assert!(chunk.len() >= config.min_size());
            }
        }

        // Verify: chunks reassemble the input at the right offsets
        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected_offset);
            let start = expected_offset as usize;
            assert_eq!(chunk.data(), &data[start..start + chunk.len()]);
            expected_offset += chunk.len() as u64;
        }
        assert_eq!(expected_offset, data.len() as u64);

        // Verify: the stream is terminal after flush
        assert!(chunker.push(b"x").unwrap_err().is_invalid_state());
    }
});
