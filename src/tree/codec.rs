//! Flat record encoding of trees.
//!
//! A tree is written as the pre-order sequence of its nodes, one
//! [`TreeRecord`] each. A record with `child_count == 0` is a leaf; any
//! other record is followed by the records of its `child_count` subtrees.
//! Roots follow one another at the top level. This lets a storage layer
//! cache a tree and rebuild it (and its index) without the original bytes.

use tracing::debug;

use super::{HashNode, HashTree};
use crate::chunk::ChunkHash;
use crate::error::ChunkError;

/// Guards recursion on hostile input. Real trees are far shallower.
const MAX_DECODE_DEPTH: usize = 64;

/// One node of a serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeRecord {
    /// The node's hash.
    pub hash: ChunkHash,
    /// Number of direct children; 0 for leaves.
    pub child_count: u64,
    /// Bytes covered by the node.
    pub length: u64,
}

impl HashTree {
    /// Serializes the tree as pre-order records.
    pub fn to_records(&self) -> Vec<TreeRecord> {
        let mut records = Vec::new();
        let mut stack: Vec<&HashNode> = self.roots().iter().rev().collect();
        while let Some(node) = stack.pop() {
            records.push(TreeRecord {
                hash: *node.hash(),
                // usize never exceeds 64 bits, so this cannot truncate.
                child_count: node.children().len() as u64,
                length: node.length(),
            });
            stack.extend(node.children().iter().rev());
        }
        records
    }

    /// Rebuilds a tree from pre-order records.
    ///
    /// # Errors
    ///
    /// [`ChunkError::MalformedTree`] when the records are truncated, nest
    /// too deeply, or describe a tree that fails [`HashNode::validate`].
    pub fn from_records<I>(records: I) -> Result<Self, ChunkError>
    where
        I: IntoIterator<Item = TreeRecord>,
    {
        let mut records = records.into_iter();
        let mut roots = Vec::new();
        while let Some(record) = records.next() {
            let root = decode_node(&mut records, record, 0)?;
            root.validate()?;
            roots.push(root);
        }

        if let Some(first) = roots.first() {
            if roots.iter().any(|root| root.level() != first.level()) {
                return Err(ChunkError::malformed("roots are at different levels"));
            }
        }

        let tree = HashTree::new(roots);
        debug!(roots = tree.roots().len(), bytes = tree.length(), "decoded hash tree");
        Ok(tree)
    }
}

fn decode_node<I>(records: &mut I, record: TreeRecord, depth: usize) -> Result<HashNode, ChunkError>
where
    I: Iterator<Item = TreeRecord>,
{
    if record.child_count == 0 {
        return Ok(HashNode::leaf(record.hash, record.length));
    }
    if depth >= MAX_DECODE_DEPTH {
        return Err(ChunkError::malformed("tree nests too deeply"));
    }

    let mut children = Vec::new();
    for _ in 0..record.child_count {
        let next = records.next().ok_or_else(|| {
            ChunkError::malformed(format!(
                "truncated records: node {} expects {} children",
                record.hash.short(),
                record.child_count
            ))
        })?;
        children.push(decode_node(records, next, depth + 1)?);
    }

    let level = children
        .iter()
        .map(HashNode::level)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| ChunkError::malformed("tree level overflows"))?;
    Ok(HashNode::from_parts(record.hash, record.length, level, children))
}
