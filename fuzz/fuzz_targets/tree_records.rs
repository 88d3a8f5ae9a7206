#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkdiff::{ChunkHash, HashTree, LocalIndex, TreeRecord};

// Arbitrary record streams must decode to a valid tree or be rejected,
// never panic.
fuzz_target!(|raw: Vec<(u8, u8, u16)>| {
    let records = raw.into_iter().map(|(seed, child_count, length)| TreeRecord {
        hash: ChunkHash::new([seed; 32]),
        child_count: u64::from(child_count % 4),
        length: u64::from(length),
    });

    if let Ok(tree) = HashTree::from_records(records) {
        assert!(tree.validate().is_ok());
        let _ = LocalIndex::build(&tree);
    }
});
