//! Fan-out tree nodes.

use crate::chunk::ChunkHash;
use crate::error::ChunkError;
use crate::hash::Blake3Hasher;

/// A node of the fan-out hash tree.
///
/// Leaves (level 0) stand for one chunk and carry its content hash. An
/// interior node at level `L` owns, in stream order, the level `L - 1`
/// nodes grouped between two level-`L` boundaries; its hash is the digest
/// of their hashes. Children are owned exclusively by their parent and the
/// tree is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashNode {
    hash: ChunkHash,
    length: u64,
    level: u8,
    children: Vec<HashNode>,
}

impl HashNode {
    /// Creates a leaf for a chunk of `length` bytes.
    pub fn leaf(hash: ChunkHash, length: u64) -> Self {
        Self {
            hash,
            length,
            level: 0,
            children: Vec::new(),
        }
    }

    /// Groups `children` under a new node at `level`.
    pub(crate) fn interior(level: u8, children: Vec<HashNode>) -> Self {
        let hash = Blake3Hasher::hash_children(children.iter().map(HashNode::hash));
        let length = children.iter().map(HashNode::length).sum();
        Self {
            hash,
            length,
            level,
            children,
        }
    }

    /// Assembles a node from stored parts without checking them.
    ///
    /// Intended for storage layers that persist trees in their own format.
    /// Use [`validate`](Self::validate) (the index builder always does)
    /// before trusting the result.
    pub fn from_parts(hash: ChunkHash, length: u64, level: u8, children: Vec<HashNode>) -> Self {
        Self {
            hash,
            length,
            level,
            children,
        }
    }

    /// The node's digest.
    pub fn hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// Number of stream bytes covered by the node.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Tree level: 0 for leaves.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Child nodes in stream order; empty for leaves.
    pub fn children(&self) -> &[HashNode] {
        &self.children
    }

    /// Returns true for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates the leaves below this node in stream order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HashNode::node_count).sum::<usize>()
    }

    /// Checks the structural invariants of this subtree.
    ///
    /// Rejects leaves that are empty or claim a level, interior nodes with
    /// no children, children at the wrong level, and interior lengths or
    /// hashes that disagree with their children.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.children.is_empty() {
            if self.level != 0 {
                return Err(ChunkError::malformed(format!(
                    "interior node {} at level {} has no children",
                    self.hash.short(),
                    self.level
                )));
            }
            if self.length == 0 {
                return Err(ChunkError::malformed(format!(
                    "leaf {} has zero length",
                    self.hash.short()
                )));
            }
            return Ok(());
        }

        if self.level == 0 {
            return Err(ChunkError::malformed(format!(
                "leaf {} has {} children",
                self.hash.short(),
                self.children.len()
            )));
        }

        let mut length = 0u64;
        for child in &self.children {
            if u16::from(child.level) + 1 != u16::from(self.level) {
                return Err(ChunkError::malformed(format!(
                    "node {} at level {} has a child at level {}",
                    self.hash.short(),
                    self.level,
                    child.level
                )));
            }
            child.validate()?;
            length = length.checked_add(child.length).ok_or_else(|| {
                ChunkError::malformed(format!("node {} length overflows", self.hash.short()))
            })?;
        }

        if length != self.length {
            return Err(ChunkError::malformed(format!(
                "node {} claims {} bytes but its children cover {}",
                self.hash.short(),
                self.length,
                length
            )));
        }

        let expected = Blake3Hasher::hash_children(self.children.iter().map(HashNode::hash));
        if expected != self.hash {
            return Err(ChunkError::malformed(format!(
                "node {} does not match the hash of its children",
                self.hash.short()
            )));
        }

        Ok(())
    }
}

/// Depth-first, in-order iterator over the leaves of a subtree.
pub struct Leaves<'a> {
    stack: Vec<&'a HashNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a HashNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}
