//! Streaming construction of the fan-out tree.
//!
//! # Example
//!
//! ```
//! use chunkdiff::{ChunkConfig, TreeBuilder};
//! use bytes::Bytes;
//!
//! let mut builder = TreeBuilder::new(ChunkConfig::new(16, 64, 256)?)?;
//! builder.push(Bytes::from(vec![1u8; 3000]));
//! builder.push(Bytes::from(vec![2u8; 3000]));
//! let tree = builder.finish();
//!
//! assert_eq!(tree.length(), 6000);
//! # Ok::<(), chunkdiff::ChunkError>(())
//! ```

use std::io::Read;

use bytes::Bytes;
use tracing::debug;

use super::{HashNode, HashTree};
use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::config::ChunkConfig;
use crate::error::ChunkError;

/// Builds a [`HashTree`] from streamed bytes.
///
/// `levels[L]` holds the level-`L` nodes not yet grouped under a parent.
/// A chunk whose boundary has level `K` is pushed as a leaf, then levels
/// `0..K` are closed in turn, each becoming one node on the level above.
/// Only hashes are retained; chunk bytes are dropped as soon as they are
/// hashed.
#[derive(Debug)]
pub struct TreeBuilder {
    chunker: Chunker,
    levels: Vec<Vec<HashNode>>,
    leaf_count: u64,
}

impl TreeBuilder {
    /// Creates a builder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` fails
    /// [`ChunkConfig::validate`].
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self {
            chunker: Chunker::new(config),
            levels: vec![Vec::new()],
            leaf_count: 0,
        })
    }

    /// Feeds stream bytes into the builder.
    pub fn push(&mut self, data: Bytes) {
        for chunk in self.chunker.push(data) {
            self.add_chunk(&chunk);
        }
    }

    /// Adds a chunk produced by a chunker with the same configuration.
    pub(crate) fn add_chunk(&mut self, chunk: &Chunk) {
        self.levels[0].push(HashNode::leaf(chunk.hash, chunk.len() as u64));
        self.leaf_count += 1;
        for level in 1..=chunk.level {
            self.close(level);
        }
    }

    /// Closes the pending level-`level - 1` nodes into one level-`level` node.
    fn close(&mut self, level: u8) {
        let below = usize::from(level) - 1;
        let children = std::mem::take(&mut self.levels[below]);
        if children.is_empty() {
            return;
        }
        if self.levels.len() <= usize::from(level) {
            self.levels.resize_with(usize::from(level) + 1, Vec::new);
        }
        self.levels[usize::from(level)].push(HashNode::interior(level, children));
    }

    /// Flushes every open group bottom-up and returns the finished tree.
    ///
    /// The roots are the nodes of the highest level that received any node;
    /// a stream shorter than one chunk yields its single leaf as the root.
    /// The builder is reset for reuse.
    pub fn finish(&mut self) -> HashTree {
        if let Some(chunk) = self.chunker.finish() {
            self.add_chunk(&chunk);
        }

        let roots = match self.levels.iter().rposition(|nodes| !nodes.is_empty()) {
            Some(top) => {
                for level in 1..=top {
                    // `top` never exceeds the detector's u8 level cap.
                    self.close(level as u8);
                }
                std::mem::take(&mut self.levels[top])
            }
            None => Vec::new(),
        };

        let tree = HashTree::new(roots);
        debug!(
            leaves = self.leaf_count,
            roots = tree.roots().len(),
            bytes = tree.length(),
            "built hash tree"
        );

        self.levels = vec![Vec::new()];
        self.leaf_count = 0;
        tree
    }
}

/// Reads `reader` to the end and builds its tree.
///
/// # Errors
///
/// Any I/O error aborts the build; no partial tree is returned. An invalid
/// `config` is rejected before anything is read.
///
/// # Example
///
/// ```
/// use chunkdiff::{build_tree, ChunkConfig};
/// use std::io::Cursor;
///
/// let tree = build_tree(Cursor::new(b"short input"), ChunkConfig::default())?;
/// assert_eq!(tree.roots().len(), 1);
/// assert!(tree.roots()[0].is_leaf());
/// # Ok::<(), chunkdiff::ChunkError>(())
/// ```
pub fn build_tree<R: Read>(reader: R, config: ChunkConfig) -> Result<HashTree, ChunkError> {
    let mut builder = TreeBuilder::new(config)?;
    for chunk in Chunker::new(config).chunk(reader) {
        builder.add_chunk(&chunk?);
    }
    Ok(builder.finish())
}
