//! Hash lookup over an original stream's chunks.
//!
//! Delta generation only needs one capability from the original side:
//! "is a chunk with this hash known, and where is it?". That capability is
//! [`ChunkLookup`]. Two providers implement it:
//!
//! - [`LocalIndex`] - an in-memory table built eagerly from a [`HashTree`]
//! - [`RemoteIndex`] - request/response lookups answered by another party
//!   (typically the host holding the original tree), with a timeout
//!
//! [`ChunkIndex`] picks one of them at runtime.
//!
//! [`HashTree`]: crate::HashTree

mod local;
mod remote;

use std::sync::Arc;

pub use local::LocalIndex;
pub use remote::{LookupRequest, RemoteIndex};

use crate::chunk::ChunkHash;

/// Where a chunk lives in the original stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkMeta {
    /// Position of the leaf among all leaves, in stream order.
    pub order: u64,
    /// Byte offset of the chunk in the original stream.
    pub offset: u64,
    /// Chunk length in bytes.
    pub length: u64,
}

/// Answers "hash in, chunk metadata or absent out" for one original stream.
///
/// Implementations must behave as a pure function of the hash for as long
/// as they are in use, and must be shareable across threads so concurrent
/// delta runs can use one index.
pub trait ChunkLookup: Send + Sync {
    /// Looks up a chunk by content hash.
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta>;
}

impl<T: ChunkLookup + ?Sized> ChunkLookup for &T {
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta> {
        (**self).lookup(hash)
    }
}

impl<T: ChunkLookup + ?Sized> ChunkLookup for Arc<T> {
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta> {
        (**self).lookup(hash)
    }
}

/// A lookup provider selected at runtime.
#[derive(Debug)]
pub enum ChunkIndex {
    /// Eager in-memory table.
    Local(LocalIndex),
    /// Lazy lookups against a remote holder of the tree.
    Remote(RemoteIndex),
}

impl ChunkLookup for ChunkIndex {
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta> {
        match self {
            ChunkIndex::Local(index) => index.lookup(hash),
            ChunkIndex::Remote(index) => index.lookup(hash),
        }
    }
}

impl From<LocalIndex> for ChunkIndex {
    fn from(index: LocalIndex) -> Self {
        ChunkIndex::Local(index)
    }
}

impl From<RemoteIndex> for ChunkIndex {
    fn from(index: RemoteIndex) -> Self {
        ChunkIndex::Remote(index)
    }
}
