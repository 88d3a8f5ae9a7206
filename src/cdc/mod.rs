//! Content-defined boundary detection.
//!
//! - [`RollingBoundary`] - gear rolling hash reporting multi-level boundaries

mod rolling;

pub use rolling::RollingBoundary;
