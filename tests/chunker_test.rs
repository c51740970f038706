// Integration tests for the StreamChunker push/flush API
// Tests cover: push/flush semantics, split invariance, bounds, offsets, errors

use std::collections::HashSet;

use bytes::Bytes;
use dedup_chunker::{Algorithm, Chunk, ChunkError, ChunkerConfig, ChunkerState, StreamChunker};

fn pseudo_random(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect()
}

fn config(algorithm: Algorithm) -> ChunkerConfig {
    ChunkerConfig::new(256, 1024, 4096)
        .unwrap()
        .with_algorithm(algorithm)
        .with_window_size(48)
}

/// Pushes `data` in `step` sized buffers, then flushes.
fn chunk_all(config: ChunkerConfig, data: &[u8], step: usize) -> Vec<Chunk> {
    let mut chunker = StreamChunker::new(config).unwrap();
    let mut chunks = Vec::new();
    for buf in data.chunks(step.max(1)) {
        chunks.extend(chunker.push(buf).unwrap());
    }
    chunks.extend(chunker.flush().unwrap());
    chunks
}

fn concat(chunks: &[Chunk]) -> Vec<u8> {
    chunks.iter().flat_map(|c| c.data().iter().copied()).collect()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_input() {
    let mut chunker = StreamChunker::new(ChunkerConfig::default()).unwrap();

    assert!(chunker.push(&[]).unwrap().is_empty(), "Empty push should produce no chunks");
    assert_eq!(chunker.pending_len(), 0);
    assert!(
        chunker.flush().unwrap().is_empty(),
        "flush() on an empty stream should not emit a zero-length chunk"
    );
}

#[test]
fn test_small_data_below_min_size() {
    let mut chunker = StreamChunker::new(ChunkerConfig::new(4, 16, 64).unwrap()).unwrap();

    let chunks = chunker.push(&[0xAA; 3]).unwrap();
    assert!(chunks.is_empty(), "Data below min_size should not produce chunks");
    assert_eq!(chunker.pending_len(), 3, "All data should be pending");

    let tail = chunker.flush().unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].len(), 3, "Final chunk may be shorter than min_size");
}

#[test]
fn test_large_data_reconstructs() {
    for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
        let data = pseudo_random(100_000, 0x1234_5678);
        let chunks = chunk_all(config(algorithm), &data, data.len());

        assert!(chunks.len() > 10, "{algorithm:?} should find natural boundaries");
        assert_eq!(concat(&chunks), data, "Concatenated chunks must equal the input");
    }
}

// ============================================================================
// Forced Boundaries
// ============================================================================

#[test]
fn test_forced_boundary_then_flush() {
    // A mask this wide never matches on 20 bytes: only max_size cuts.
    let config = ChunkerConfig::new(4, 8, 16).unwrap().with_mask_bits(40);
    let mut chunker = StreamChunker::new(config).unwrap();

    let chunks = chunker.push(&[0xAA; 20]).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), 16);
    assert_eq!(chunks[0].offset, 0);

    let tail = chunker.flush().unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].len(), 4);
    assert_eq!(tail[0].offset, 16);
}

#[test]
fn test_chunk_sizes_within_bounds() {
    for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
        let data = pseudo_random(200_000, 7);
        let chunks = chunk_all(config(algorithm), &data, 5000);
        let (last, body) = chunks.split_last().unwrap();

        for chunk in body {
            assert!(
                (256..=4096).contains(&chunk.len()),
                "{algorithm:?} produced a {} byte chunk",
                chunk.len()
            );
        }
        assert!(last.len() <= 4096);
    }
}

#[test]
fn test_constant_input_never_exceeds_max() {
    let data = vec![0u8; 50_000];
    let chunks = chunk_all(config(Algorithm::Gear), &data, 3000);
    assert!(chunks.iter().all(|c| c.len() <= 4096));
    assert_eq!(concat(&chunks), data);
}

// ============================================================================
// Split Invariance
// ============================================================================

#[test]
fn test_determinism_across_push_sizes() {
    for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
        let data = pseudo_random(60_000, 0xfeed);
        let reference = chunk_all(config(algorithm), &data, data.len());

        for step in [1, 3, 100, 255, 4096, 4097, 8192] {
            let chunks = chunk_all(config(algorithm), &data, step);
            assert_eq!(chunks, reference, "{algorithm:?} differs at push size {step}");
        }
    }
}

#[test]
fn test_irregular_push_sizes() {
    let data = pseudo_random(40_000, 99);
    let reference = chunk_all(config(Algorithm::Gear), &data, data.len());

    let mut chunker = StreamChunker::new(config(Algorithm::Gear)).unwrap();
    let mut chunks = Vec::new();
    let mut rest = &data[..];
    let mut size = 1;
    while !rest.is_empty() {
        let n = size.min(rest.len());
        chunks.extend(chunker.push(&rest[..n]).unwrap());
        rest = &rest[n..];
        size = size * 7 % 5003 + 1;
    }
    chunks.extend(chunker.flush().unwrap());

    assert_eq!(chunks, reference);
}

#[test]
fn test_push_bytes_matches_push() {
    let data = pseudo_random(30_000, 5);
    let reference = chunk_all(config(Algorithm::Buzhash), &data, 1000);

    let shared = Bytes::from(data);
    let mut chunker = StreamChunker::new(config(Algorithm::Buzhash)).unwrap();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < shared.len() {
        let end = (start + 1000).min(shared.len());
        chunks.extend(chunker.push_bytes(shared.slice(start..end)).unwrap());
        start = end;
    }
    chunks.extend(chunker.flush().unwrap());

    assert_eq!(chunks, reference);
}

#[test]
fn test_insertion_only_disturbs_nearby_chunks() {
    for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
        let original = pseudo_random(100_000, 0x1234_5678);
        let mut shifted = pseudo_random(777, 99);
        shifted.extend_from_slice(&original);

        let before = chunk_all(config(algorithm), &original, 8192);
        let after = chunk_all(config(algorithm), &shifted, 8192);

        let known: HashSet<&[u8]> = before.iter().map(Chunk::data).collect();
        let reused = after.iter().filter(|c| known.contains(c.data())).count();
        assert!(
            reused * 10 >= before.len() * 9,
            "{algorithm:?}: only {reused} of {} chunks survived a prefix insertion",
            before.len()
        );
    }
}

// ============================================================================
// Offset Tracking
// ============================================================================

#[test]
fn test_chunk_offset_tracking() {
    let data = pseudo_random(50_000, 3);
    let chunks = chunk_all(config(Algorithm::Gear), &data, 777);

    let mut expected = 0u64;
    for chunk in &chunks {
        assert_eq!(chunk.offset, expected, "Chunks must be contiguous and ordered");
        expected = chunk.end();
    }
    assert_eq!(expected, data.len() as u64);
}

#[test]
fn test_pending_tracks_unclosed_bytes() {
    let data = pseudo_random(10_000, 11);
    let mut chunker = StreamChunker::new(config(Algorithm::Gear)).unwrap();

    let mut emitted = 0;
    for buf in data.chunks(333) {
        emitted += chunker.push(buf).unwrap().iter().map(Chunk::len).sum::<usize>();
    }
    assert_eq!(emitted as u64, chunker.offset());
    assert_eq!(emitted + chunker.pending_len(), data.len());
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_chunks_own_their_buffers() {
    let mut input = vec![0x55u8; 20];
    let config = ChunkerConfig::new(4, 8, 16).unwrap().with_mask_bits(40);
    let mut chunker = StreamChunker::new(config).unwrap();

    let mut chunks = chunker.push(&input).unwrap();
    input.fill(0);

    let chunk = &mut chunks[0];
    assert!(chunk.data().iter().all(|&b| b == 0x55));
    chunk.data_mut()[0] = 1;
    assert_eq!(chunk.data.capacity(), chunk.len());

    let tail = chunker.flush().unwrap();
    assert!(tail[0].data().iter().all(|&b| b == 0x55), "Pending bytes were copied");
}

// ============================================================================
// Edge Cases and Error Conditions
// ============================================================================

#[test]
fn test_push_after_flush() {
    let mut chunker = StreamChunker::new(ChunkerConfig::default()).unwrap();
    chunker.push(b"some bytes").unwrap();
    chunker.flush().unwrap();
    assert_eq!(chunker.state(), ChunkerState::Flushed);

    let err = chunker.push(b"late").unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(err.to_string(), "invalid state: cannot push a flushed stream");
}

#[test]
fn test_multiple_flush_calls() {
    let mut chunker = StreamChunker::new(ChunkerConfig::default()).unwrap();
    chunker.flush().unwrap();

    let err = chunker.flush().unwrap_err();
    assert!(matches!(
        err,
        ChunkError::InvalidState {
            operation: "flush",
            state: ChunkerState::Flushed
        }
    ));
}

#[test]
fn test_config_validation() {
    assert!(matches!(
        ChunkerConfig::new(0, 16, 64),
        Err(ChunkError::InvalidConfig { .. })
    ));
    assert!(ChunkerConfig::new(32, 16, 64).is_err());
    assert!(ChunkerConfig::new(4, 128, 64).is_err());

    let bad = ChunkerConfig::default().with_window_size(0);
    assert!(matches!(StreamChunker::new(bad), Err(ChunkError::InvalidConfig { .. })));
}

#[test]
fn test_min_equals_max() {
    let config = ChunkerConfig::new(100, 100, 100).unwrap();
    let data = pseudo_random(1050, 1);
    let chunks = chunk_all(config, &data, 64);

    let sizes: Vec<usize> = chunks.iter().map(Chunk::len).collect();
    assert_eq!(sizes, [vec![100; 10], vec![50]].concat());
}
