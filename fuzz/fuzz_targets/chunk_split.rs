#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use dedup_chunker::{Algorithm, ChunkerConfig, StreamChunker};

// The first bytes choose the push sizes, the rest is the stream.
fuzz_target!(|input: Vec<u8>| {
    if input.len() < 4 {
        return;
    }
    let (sizes, data) = input.split_at(4);

    for algorithm in [Algorithm::Gear, Algorithm::Buzhash] {
        let config = ChunkerConfig::new(16, 64, 256)
            .unwrap()
            .with_algorithm(algorithm)
            .with_window_size(8);

        let mut whole = StreamChunker::new(config).unwrap();
        let mut expected = whole.push(data).unwrap();
        expected.extend(whole.flush().unwrap());

        // Alternate borrowed and owned pushes of varying sizes
        let shared = Bytes::copy_from_slice(data);
        let mut split = StreamChunker::new(config).unwrap();
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut turn = 0;
        while start < data.len() {
            let step = usize::from(sizes[turn % sizes.len()]) + 1;
            let end = (start + step).min(data.len());
            if turn % 2 == 0 {
                chunks.extend(split.push(&data[start..end]).unwrap());
            } else {
                chunks.extend(split.push_bytes(shared.slice(start..end)).unwrap());
            }
            start = end;
            turn += 1;
        }
        chunks.extend(split.flush().unwrap());

        assert_eq!(chunks, expected);
    }
});
