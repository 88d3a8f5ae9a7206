//! Strong hashing for chunk and node identity.
//!
//! - [`Blake3Hasher`] - BLAKE3 leaf and interior-node hashing

mod blake3;

pub use blake3::Blake3Hasher;
