//! Core chunking engine - Chunker with streaming API.
//!
//! - [`Chunker`] - Stateful CDC engine that processes streaming bytes
//! - `push()` - Feed data in any size (1 byte, 8KB, 1MB, etc.)
//! - `finish()` - Flush remaining data when stream ends
//!
//! # Example
//!
//! ```
//! use chunkdiff::{Chunker, ChunkConfig};
//! use bytes::Bytes;
//!
//! let mut chunker = Chunker::new(ChunkConfig::default());
//!
//! let mut chunks = chunker.push(Bytes::from(&b"first"[..]));
//! chunks.extend(chunker.push(Bytes::from(&b"second"[..])));
//! chunks.extend(chunker.finish());
//!
//! assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 11);
//! ```

use bytes::Bytes;
use tracing::trace;

use crate::cdc::RollingBoundary;
use crate::chunk::Chunk;
use crate::config::ChunkConfig;
use crate::hash::Blake3Hasher;

/// A chunker that turns streaming bytes into hashed, levelled leaf chunks.
///
/// # Determinism
///
/// Identical byte streams produce identical chunks (data, offsets, hashes
/// and levels), regardless of how the stream is split across `push()`
/// calls.
///
/// # Zero-Copy
///
/// Chunks that fall entirely inside one pushed `Bytes` are sliced from it;
/// only chunks straddling two pushes are copied.
///
/// # Memory
///
/// At most `max_size - 1` bytes are held between calls.
#[derive(Debug, Clone)]
pub struct Chunker {
    detector: RollingBoundary,
    pending: Option<Bytes>,
    offset: u64,
    config: ChunkConfig,
}

impl Chunker {
    /// Creates a new chunker with the given configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::{Chunker, ChunkConfig};
    ///
    /// let chunker = Chunker::new(ChunkConfig::default());
    /// ```
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            detector: RollingBoundary::new(&config),
            pending: None,
            offset: 0,
            config,
        }
    }

    fn emit(&mut self, data: Bytes, level: u8) -> Chunk {
        let hash = Blake3Hasher::hash(&data);
        let chunk = Chunk::new(data, self.offset, hash, level);
        trace!(offset = chunk.offset, len = chunk.len(), level, "chunk boundary");
        self.offset = chunk.end();
        chunk
    }

    /// Pushes data into the chunker and returns the chunks it completes.
    ///
    /// Bytes after the last boundary are kept internally and prefixed to
    /// the next push (or emitted by [`finish`](Self::finish)).
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::{Chunker, ChunkConfig};
    /// use bytes::Bytes;
    ///
    /// let mut chunker = Chunker::new(ChunkConfig::new(16, 64, 256)?);
    /// let chunks = chunker.push(Bytes::from(vec![7u8; 1000]));
    ///
    /// assert!(chunks.iter().all(|c| c.len() <= 256));
    /// # Ok::<(), chunkdiff::ChunkError>(())
    /// ```
    pub fn push(&mut self, data: Bytes) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start = 0;

        while let Some((len, level)) = self.detector.find_boundary(&data[start..]) {
            let end = start + len;
            let chunk_data = match self.pending.take() {
                Some(pending) => crate::util::combine_bytes(&pending, &data[start..end]),
                None => data.slice(start..end),
            };
            chunks.push(self.emit(chunk_data, level));
            start = end;
        }

        if start < data.len() {
            let rest = data.slice(start..);
            self.pending = Some(match self.pending.take() {
                Some(pending) => crate::util::combine_bytes(&pending, &rest),
                None => rest,
            });
        }

        chunks
    }

    /// Finalizes the stream and returns the trailing chunk, if any.
    ///
    /// The trailing chunk ends at end-of-stream rather than at a content
    /// boundary and is reported at level 0. The chunker is reset and can be
    /// reused for a new stream.
    pub fn finish(&mut self) -> Option<Chunk> {
        let pending = self.pending.take().filter(|p| !p.is_empty());
        let chunk = pending.map(|data| self.emit(data, 0));
        self.reset();
        chunk
    }

    /// Resets the chunker state for a new stream.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.pending = None;
        self.offset = 0;
    }

    /// Chunks an in-memory buffer in one call.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::{Chunker, ChunkConfig};
    ///
    /// let chunker = Chunker::new(ChunkConfig::default());
    /// let chunks = chunker.chunk_bytes(&b"hello world"[..]);
    ///
    /// assert_eq!(chunks.len(), 1);
    /// ```
    pub fn chunk_bytes(&self, data: impl Into<Bytes>) -> Vec<Chunk> {
        let mut chunker = Self::new(self.config);
        let mut chunks = chunker.push(data.into());
        chunks.extend(chunker.finish());
        chunks
    }

    /// Returns the offset of the next chunk to be emitted.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the number of bytes waiting for a boundary.
    pub fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, Bytes::len)
    }

    /// Returns the configuration used by this chunker.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}
