//! Internal buffer management for `Read`-driven loops.
//!
//! Not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
