//! Fan-out hash trees.
//!
//! - [`HashNode`] - Exclusively owned tree node (leaf = chunk)
//! - [`HashTree`] - The roots produced for one stream
//! - [`TreeBuilder`] / [`build_tree`] - Streaming construction
//! - [`TreeRecord`] - Flat pre-order encoding for caching

mod builder;
mod codec;
mod node;

pub use builder::{TreeBuilder, build_tree};
pub use codec::TreeRecord;
pub use node::{HashNode, Leaves};

/// The fan-out tree of one stream: zero or more roots in stream order.
///
/// An empty stream has no roots. The roots are owned by the tree, and
/// every other node by its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTree {
    roots: Vec<HashNode>,
}

impl HashTree {
    /// Wraps a list of roots.
    pub fn new(roots: Vec<HashNode>) -> Self {
        Self { roots }
    }

    /// The top-level nodes in stream order.
    pub fn roots(&self) -> &[HashNode] {
        &self.roots
    }

    /// Consumes the tree, returning its roots.
    pub fn into_roots(self) -> Vec<HashNode> {
        self.roots
    }

    /// Returns true when the stream was empty.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total stream length in bytes.
    pub fn length(&self) -> u64 {
        self.roots.iter().map(HashNode::length).sum()
    }

    /// All leaves in stream order.
    pub fn leaves(&self) -> impl Iterator<Item = &HashNode> {
        self.roots.iter().flat_map(HashNode::leaves)
    }

    /// Validates every root.
    pub fn validate(&self) -> Result<(), crate::error::ChunkError> {
        self.roots.iter().try_for_each(HashNode::validate)
    }
}
