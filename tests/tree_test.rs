// Integration tests for tree construction, validation and record encoding

use std::io::Cursor;

use bytes::Bytes;
use chunkdiff::{
    ChunkConfig, ChunkError, ChunkHash, ChunkLookup, Chunker, DeltaGenerator, HashNode, HashTree,
    LocalIndex, TreeBuilder, TreeRecord, build_tree,
};

fn config() -> ChunkConfig {
    ChunkConfig::new(16, 64, 256).unwrap().with_fanout_bits(2)
}

fn noise(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed as u8
        })
        .collect()
}

fn check_uniform_depth(node: &HashNode) {
    for child in node.children() {
        assert_eq!(child.level() + 1, node.level(), "Children sit one level below");
        check_uniform_depth(child);
    }
}

#[test]
fn test_tree_shape() {
    let data = noise(150_000, 1);
    let tree = build_tree(Cursor::new(&data), config()).unwrap();

    tree.validate().unwrap();
    assert_eq!(tree.length(), data.len() as u64);

    let top = tree.roots()[0].level();
    for root in tree.roots() {
        assert_eq!(root.level(), top, "All roots share one level");
        check_uniform_depth(root);
        assert!(!root.children().is_empty() || root.is_leaf());
    }
}

#[test]
fn test_leaves_are_the_chunks() {
    let data = noise(80_000, 2);
    let tree = build_tree(Cursor::new(&data), config()).unwrap();
    let chunks = Chunker::new(config()).chunk_bytes(data);

    let leaves: Vec<_> = tree.leaves().map(|leaf| (*leaf.hash(), leaf.length())).collect();
    let expected: Vec<_> = chunks.iter().map(|c| (c.hash, c.len() as u64)).collect();
    assert_eq!(leaves, expected);
}

#[test]
fn test_same_content_same_tree() {
    let data = noise(60_000, 3);
    let a = build_tree(Cursor::new(&data), config()).unwrap();

    let mut builder = TreeBuilder::new(config()).unwrap();
    for piece in data.chunks(1234) {
        builder.push(Bytes::copy_from_slice(piece));
    }
    let b = builder.finish();

    assert_eq!(a, b);
    let hashes = |tree: &HashTree| tree.roots().iter().map(|r| *r.hash()).collect::<Vec<_>>();
    assert_eq!(hashes(&a), hashes(&b));
}

#[test]
fn test_local_edit_keeps_distant_subtrees() {
    let original = noise(200_000, 4);
    let mut edited = original.clone();
    edited[100_000] ^= 0x5A;

    let before = build_tree(Cursor::new(&original), config()).unwrap();
    let after = build_tree(Cursor::new(&edited), config()).unwrap();
    assert_ne!(before, after);

    let index = LocalIndex::build(&before).unwrap();
    let shared = after.leaves().filter(|leaf| index.lookup(leaf.hash()).is_some()).count();
    let total = after.leaves().count();
    assert!(
        shared + 10 >= total,
        "Only leaves near the edit should change ({shared} of {total} shared)"
    );
}

#[test]
fn test_records_round_trip_through_index() {
    let data = noise(50_000, 5);
    let tree = build_tree(Cursor::new(&data), config()).unwrap();

    let records: Vec<TreeRecord> = tree.to_records();
    let interior: Vec<_> = records.iter().filter(|r| r.child_count > 0).collect();
    assert!(!interior.is_empty());
    let children: u64 = interior.iter().map(|r| r.child_count).sum();
    assert_eq!(records.len() as u64, tree.roots().len() as u64 + children);
    let decoded = HashTree::from_records(records).unwrap();
    assert_eq!(decoded, tree);

    let direct = LocalIndex::build(&tree).unwrap();
    let cached = LocalIndex::build(&decoded).unwrap();
    for leaf in tree.leaves() {
        assert_eq!(direct.lookup(leaf.hash()), cached.lookup(leaf.hash()));
    }
}

#[test]
fn test_tampered_records_are_rejected() {
    let tree = build_tree(Cursor::new(noise(20_000, 6)), config()).unwrap();
    let mut records = tree.to_records();
    records[0].hash = ChunkHash::new([0xAB; 32]);

    let err = HashTree::from_records(records).unwrap_err();
    assert!(matches!(err, ChunkError::MalformedTree { .. }));
}

#[test]
fn test_empty_stream_has_no_roots() {
    let tree = build_tree(Cursor::new(Vec::new()), config()).unwrap();
    assert!(tree.is_empty());
    assert!(tree.to_records().is_empty());
    assert!(LocalIndex::build(&tree).unwrap().is_empty());
}

#[test]
fn test_zero_fanout_is_rejected_everywhere() {
    let bad = config().with_fanout_bits(0);
    let data = noise(5_000, 7);

    assert!(matches!(TreeBuilder::new(bad), Err(ChunkError::InvalidConfig { .. })));
    assert!(matches!(DeltaGenerator::new(bad), Err(ChunkError::InvalidConfig { .. })));
    assert!(matches!(
        build_tree(Cursor::new(&data), bad),
        Err(ChunkError::InvalidConfig { .. })
    ));

    // The bare chunker never panics on an unvalidated config.
    let chunks = Chunker::new(bad).chunk_bytes(data.clone());
    assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), data.len());
}
