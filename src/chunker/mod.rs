//! Chunking engine for processing byte streams.
//!
//! - [`Chunker`] - Stateful CDC engine with `push()`/`finish()` API
//! - [`ChunkIter`] - Iterator over chunks of a [`std::io::Read`] source

mod engine;
mod iter;

pub use engine::Chunker;
pub use iter::ChunkIter;
