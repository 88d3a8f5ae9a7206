//! Copy/Literal deltas between an original and a modified stream.
//!
//! A [`DeltaGenerator`] chunks the modified stream and asks a
//! [`ChunkLookup`](crate::ChunkLookup) about every chunk. [`apply_delta`]
//! turns the resulting instructions back into bytes.

mod apply;
mod generator;
mod op;

pub use apply::apply_delta;
pub use generator::DeltaGenerator;
pub use op::{Delta, DeltaOp, DeltaStats};
