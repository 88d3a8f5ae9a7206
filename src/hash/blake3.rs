//! BLAKE3-based chunk and node hashing.

use crate::chunk::ChunkHash;

/// Incremental BLAKE3 hasher producing [`ChunkHash`] values.
#[derive(Debug, Clone)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
        }
    }

    /// Updates the hasher with more data.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalizes and returns the hash.
    pub fn finalize(&self) -> ChunkHash {
        self.state.finalize().into()
    }

    /// Hashes a leaf chunk's bytes in one shot.
    pub fn hash(data: &[u8]) -> ChunkHash {
        blake3::hash(data).into()
    }

    /// Hashes an interior node: the digest of its children's digests,
    /// concatenated in stream order.
    pub fn hash_children<'a>(children: impl IntoIterator<Item = &'a ChunkHash>) -> ChunkHash {
        let mut hasher = Self::new();
        for child in children {
            hasher.update(child.as_bytes());
        }
        hasher.finalize()
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}
