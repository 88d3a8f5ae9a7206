//! chunkdiff
//!
//! Content-defined chunking, fan-out hash trees and Copy/Literal deltas.
//!
//! `chunkdiff` splits a byte stream into content-defined chunks, arranges
//! their BLAKE3 hashes into a tree whose shape follows the content, and
//! describes a modified stream as instructions that reuse chunks of an
//! original one. It is a building block for:
//!
//! - rsync-style synchronization over a network
//! - incremental backups
//! - detecting which parts of a large file changed
//!
//! The crate intentionally:
//! - does NOT manage files or paths
//! - does NOT define a wire protocol
//! - does NOT persist chunks or trees
//!
//! It does three things: **bytes → tree**, **tree → index**,
//! **bytes + index → delta**.
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use chunkdiff::{apply_delta, build_tree, ChunkConfig, ChunkError, DeltaGenerator, LocalIndex};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let config = ChunkConfig::default();
//!
//!     let tree = build_tree(File::open("old.bin")?, config)?;
//!     let index = LocalIndex::build(&tree)?;
//!
//!     let delta = DeltaGenerator::new(config)?.generate(File::open("new.bin")?, &index)?;
//!     println!("reused {:.1}%", delta.stats.reuse_ratio() * 100.0);
//!
//!     let rebuilt = File::create("rebuilt.bin")?;
//!     apply_delta(File::open("old.bin")?, &delta.ops, rebuilt)?;
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use chunkdiff::{build_tree_async, ChunkConfig};
//! use tokio_util::compat::TokioAsyncReadCompatExt;
//!
//! async fn demo() -> Result<(), chunkdiff::ChunkError> {
//!     let file = tokio::fs::File::open("old.bin").await?;
//!     let tree = build_tree_async(file.compat(), ChunkConfig::default()).await?;
//!     println!("{} bytes", tree.length());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod delta;
mod error;
mod index;
mod tree;

mod buffer; // internal (thread-local reuse)
mod cdc; // internal gear-hash boundary detector
mod hash; // internal blake3 impl
mod util;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use chunk::{Chunk, ChunkHash};
pub use chunker::{ChunkIter, Chunker};
pub use config::{ChunkConfig, LookupConfig};
pub use delta::{Delta, DeltaGenerator, DeltaOp, DeltaStats, apply_delta};
pub use error::ChunkError;
pub use index::{ChunkIndex, ChunkLookup, ChunkMeta, LocalIndex, LookupRequest, RemoteIndex};
pub use tree::{HashNode, HashTree, Leaves, TreeBuilder, TreeRecord, build_tree};

#[cfg(feature = "async-io")]
pub use async_stream::{LeafStream, build_tree_async, chunk_async};
