//! The Chunk type - a leaf span produced by the chunker.

use bytes::Bytes;
use std::fmt;

use super::ChunkHash;

/// A content-defined chunk with its metadata.
///
/// `level` is the strength of the boundary that closed the chunk: 0 for an
/// ordinary (or forced, or end-of-stream) boundary, `L > 0` when the
/// boundary also closes a group at tree level `L`.
///
/// # Example
///
/// ```
/// use chunkdiff::{Chunk, ChunkHash};
/// use bytes::Bytes;
///
/// let data = Bytes::from_static(b"hello world");
/// let chunk = Chunk::new(data, 0, ChunkHash::new([0u8; 32]), 0);
///
/// assert_eq!(chunk.len(), 11);
/// assert_eq!(chunk.range(), 0..11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk bytes.
    pub data: Bytes,

    /// Byte offset of the chunk in its source stream.
    pub offset: u64,

    /// Content hash of `data`.
    pub hash: ChunkHash,

    /// Boundary level that terminated the chunk.
    pub level: u8,
}

impl Chunk {
    /// Creates a chunk from its parts.
    pub fn new(data: impl Into<Bytes>, offset: u64, hash: ChunkHash, level: u8) -> Self {
        Self {
            data: data.into(),
            offset,
            hash,
            level,
        }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of its source stream.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk({} bytes @ {}, level {}, hash={})",
            self.len(),
            self.offset,
            self.level,
            self.hash.short()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        Chunk::new(&b"hello"[..], 100, ChunkHash::new([0xAB; 32]), 2)
    }

    #[test]
    fn test_range() {
        let chunk = sample();
        assert_eq!(chunk.len(), 5);
        assert!(!chunk.is_empty());
        assert_eq!(chunk.end(), 105);
        assert_eq!(chunk.range(), 100..105);
    }

    #[test]
    fn test_display() {
        let s = sample().to_string();
        assert!(s.contains("5 bytes"));
        assert!(s.contains("@ 100"));
        assert!(s.contains("level 2"));
        assert!(s.contains("abababababab"));
    }
}
