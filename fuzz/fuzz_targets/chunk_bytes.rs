#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkdiff::{Chunker, ChunkConfig};

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        // Small chunks
        ChunkConfig::new(4, 16, 64).unwrap(),
        // Medium chunks, wide fan-out
        ChunkConfig::new(64, 256, 1024).unwrap().with_fanout_bits(6).with_max_level(4),
        // Default config
        ChunkConfig::default(),
    ];

    for config in configs {
        assert!(config.validate().is_ok());
        let chunks = Chunker::new(config).chunk_bytes(data.clone());

        // Verify: all chunks are within min/max bounds
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.len() <= config.max_size());
            assert!(chunk.level <= config.max_level());
            // Only enforce min_size for chunks that are not the last one
            if i < chunks.len() - 1 {
                assert!(chunk.len() >= config.min_size());
            }
        }

        // Verify: offsets are contiguous and cover the input
        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected_offset);
            expected_offset += chunk.len() as u64;
        }
        assert_eq!(expected_offset, data.len() as u64);

        // Verify: determinism
        assert_eq!(chunks, Chunker::new(config).chunk_bytes(data.clone()));
    }
});
