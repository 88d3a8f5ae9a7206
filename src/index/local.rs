//! In-memory index built from a finished tree.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use super::{ChunkLookup, ChunkMeta};
use crate::chunk::ChunkHash;
use crate::error::ChunkError;
use crate::tree::{HashTree, TreeRecord};

/// Eager `hash -> ChunkMeta` table over the leaves of one tree.
///
/// When several leaves share a hash the **first** one in stream order is
/// kept, so `Copy` instructions always reference the earliest copy of a
/// chunk. This only affects which offset is referenced, never correctness.
///
/// # Example
///
/// ```
/// use chunkdiff::{build_tree, ChunkConfig, ChunkLookup, LocalIndex};
/// use std::io::Cursor;
///
/// let tree = build_tree(Cursor::new(b"hello world"), ChunkConfig::default())?;
/// let index = LocalIndex::build(&tree)?;
///
/// let leaf = &tree.roots()[0];
/// assert_eq!(index.lookup(leaf.hash()).map(|meta| meta.length), Some(11));
/// # Ok::<(), chunkdiff::ChunkError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    entries: HashMap<ChunkHash, ChunkMeta>,
    leaf_count: u64,
    total_length: u64,
}

impl LocalIndex {
    /// Validates `tree` and indexes its leaves.
    ///
    /// # Errors
    ///
    /// [`ChunkError::MalformedTree`] if any node breaks the tree invariants;
    /// nothing is indexed in that case.
    pub fn build(tree: &HashTree) -> Result<Self, ChunkError> {
        tree.validate()?;

        let mut index = Self::default();
        for leaf in tree.leaves() {
            let meta = ChunkMeta {
                order: index.leaf_count,
                offset: index.total_length,
                length: leaf.length(),
            };
            if let Entry::Vacant(slot) = index.entries.entry(*leaf.hash()) {
                slot.insert(meta);
            }
            index.leaf_count += 1;
            index.total_length += leaf.length();
        }

        debug!(
            leaves = index.leaf_count,
            distinct = index.entries.len(),
            bytes = index.total_length,
            "built local chunk index"
        );
        Ok(index)
    }

    /// Decodes cached tree records and indexes them.
    pub fn from_records<I>(records: I) -> Result<Self, ChunkError>
    where
        I: IntoIterator<Item = TreeRecord>,
    {
        Self::build(&HashTree::from_records(records)?)
    }

    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the original stream was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaves indexed, duplicates included.
    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Length of the original stream.
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Iterates the indexed entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkHash, &ChunkMeta)> {
        self.entries.iter()
    }
}

impl ChunkLookup for LocalIndex {
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta> {
        self.entries.get(hash).copied()
    }
}
