#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use chunkdiff::{apply_delta, build_tree, ChunkConfig, DeltaGenerator, LocalIndex};

fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (original, modified) = input;
    let config = ChunkConfig::new(4, 16, 64).unwrap();

    let tree = build_tree(Cursor::new(&original), config).unwrap();
    let index = LocalIndex::build(&tree).unwrap();
    let delta = DeltaGenerator::new(config).unwrap().generate_bytes(modified.clone(), &index);

    let mut rebuilt = Vec::new();
    apply_delta(Cursor::new(&original), &delta.ops, &mut rebuilt).unwrap();
    assert_eq!(rebuilt, modified);
});
