//! Error types for chunkdiff.

use thiserror::Error;

/// Errors that can occur while chunking, indexing or applying deltas.
///
/// Remote lookup failures are deliberately absent: a lookup that times out
/// or cannot reach its provider is reported as a miss, never as an error.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// An I/O error occurred while reading input or writing output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A tree handed to the index builder (or decoded from records) is
    /// structurally inconsistent.
    #[error("malformed tree: {reason}")]
    MalformedTree {
        /// What was wrong with the tree.
        reason: String,
    },

    /// A `Copy` instruction points past the end of the basis stream.
    #[error("copy out of bounds: offset {offset} + len {len} exceeds basis")]
    CopyOutOfBounds {
        /// Offset in the basis stream.
        offset: u64,
        /// Number of bytes requested.
        len: u64,
    },

    /// Bytes read from the basis for a `Copy` do not hash to the expected value.
    #[error("hash mismatch for copy at offset {offset}")]
    HashMismatch {
        /// Offset in the basis stream.
        offset: u64,
    },
}

impl ChunkError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ChunkError::MalformedTree {
            reason: reason.into(),
        }
    }
}
