//! Internal helpers.

use bytes::Bytes;

/// Joins bytes carried over from an earlier `push` with the head of new data.
pub(crate) fn combine_bytes(a: &Bytes, b: &[u8]) -> Bytes {
    let mut combined = Vec::with_capacity(a.len() + b.len());
    combined.extend_from_slice(a);
    combined.extend_from_slice(b);
    Bytes::from(combined)
}
