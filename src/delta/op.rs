//! Delta instructions and their aggregate.

use bytes::Bytes;

use crate::chunk::ChunkHash;

/// One delta instruction.
///
/// Concatenating the output of every instruction, with each `Copy`
/// resolved against the original stream, reproduces the modified stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaOp {
    /// Reuse a chunk the index reported for the original stream.
    Copy {
        /// Hash of the reused chunk.
        hash: ChunkHash,
        /// Offset of the chunk in the original stream.
        offset: u64,
        /// Chunk length in bytes.
        len: u64,
    },
    /// Bytes not found in the original.
    Literal(Bytes),
}

impl DeltaOp {
    /// Check if this is a copy operation.
    pub const fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    /// Check if this is a literal operation.
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Number of bytes this instruction contributes to the output.
    pub fn output_len(&self) -> u64 {
        match self {
            Self::Copy { len, .. } => *len,
            Self::Literal(data) => data.len() as u64,
        }
    }
}

/// Counters describing one delta run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaStats {
    /// Number of `Copy` instructions.
    pub copy_ops: u64,
    /// Bytes covered by `Copy` instructions.
    pub copy_bytes: u64,
    /// Number of `Literal` instructions.
    pub literal_ops: u64,
    /// Bytes carried by `Literal` instructions.
    pub literal_bytes: u64,
    /// True if the sink stopped the run before the end of the stream.
    pub cancelled: bool,
}

impl DeltaStats {
    pub(crate) fn record(&mut self, op: &DeltaOp) {
        match op {
            DeltaOp::Copy { len, .. } => {
                self.copy_ops += 1;
                self.copy_bytes += len;
            }
            DeltaOp::Literal(data) => {
                self.literal_ops += 1;
                self.literal_bytes += data.len() as u64;
            }
        }
    }

    /// Length of the stream described by the instructions so far.
    pub fn output_len(&self) -> u64 {
        self.copy_bytes + self.literal_bytes
    }

    /// Fraction of the output reused from the original (1.0 for an empty output).
    pub fn reuse_ratio(&self) -> f64 {
        match self.output_len() {
            0 => 1.0,
            total => self.copy_bytes as f64 / total as f64,
        }
    }
}

/// A complete instruction sequence for one modified stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Instructions in output order.
    pub ops: Vec<DeltaOp>,
    /// Counters for `ops`.
    pub stats: DeltaStats,
}

impl Delta {
    /// Length of the reconstructed stream.
    pub fn output_len(&self) -> u64 {
        self.stats.output_len()
    }

    /// Iterates the bytes carried by literal instructions.
    pub fn literals(&self) -> impl Iterator<Item = &Bytes> {
        self.ops.iter().filter_map(|op| match op {
            DeltaOp::Literal(data) => Some(data),
            DeltaOp::Copy { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = DeltaStats::default();
        stats.record(&DeltaOp::Copy {
            hash: ChunkHash::new([0; 32]),
            offset: 0,
            len: 30,
        });
        stats.record(&DeltaOp::Literal(Bytes::from_static(b"0123456789")));

        assert_eq!(stats.copy_ops, 1);
        assert_eq!(stats.literal_ops, 1);
        assert_eq!(stats.output_len(), 40);
        assert!((stats.reuse_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_reuse_ratio() {
        assert_eq!(DeltaStats::default().reuse_ratio(), 1.0);
    }

    #[test]
    fn test_op_kinds() {
        let literal = DeltaOp::Literal(Bytes::from_static(b"abc"));
        assert!(literal.is_literal());
        assert_eq!(literal.output_len(), 3);
    }
}
