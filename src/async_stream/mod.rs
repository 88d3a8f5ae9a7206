//! Async chunking and tree building.
//!
//! Runtime-agnostic: built on the `futures-io::AsyncRead` trait.
//!
//! - [`chunk_async`] - a [`LeafStream`] of hashed leaf chunks
//! - [`build_tree_async`] - the async counterpart of [`build_tree`](crate::build_tree)
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{LeafStream, build_tree_async, chunk_async};
