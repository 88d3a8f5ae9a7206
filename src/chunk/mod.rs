//! Chunk types.
//!
//! - [`Chunk`] - Content-defined leaf chunk with data, offset, hash and boundary level
//! - [`ChunkHash`] - 32-byte BLAKE3 digest

mod data;
mod hash;

pub use data::Chunk;
pub use hash::ChunkHash;
