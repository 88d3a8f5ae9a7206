//! Reconstruction of a modified stream from the original and a delta.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use super::DeltaOp;
use crate::buffer::Buffer;
use crate::error::ChunkError;
use crate::hash::Blake3Hasher;

/// Writes the stream described by `ops` to `out`, reading `Copy` ranges
/// from `basis`. Returns the number of bytes written.
///
/// Every copied range is hashed and checked against the instruction's hash,
/// so a basis that changed since the index was built is detected rather than
/// silently producing wrong output.
///
/// # Errors
///
/// - [`ChunkError::CopyOutOfBounds`] if a `Copy` reaches past the end of `basis`
/// - [`ChunkError::HashMismatch`] if the copied bytes hash differently
/// - [`ChunkError::Io`] for read, seek or write failures
///
/// Output already written when an error occurs is incomplete and must be
/// discarded.
///
/// # Example
///
/// ```
/// use chunkdiff::{apply_delta, build_tree, ChunkConfig, DeltaGenerator, LocalIndex};
/// use std::io::Cursor;
///
/// let config = ChunkConfig::new(64, 256, 1024)?;
/// let original = b"the quick brown fox jumps over the lazy dog".repeat(100);
/// let mut modified = original.clone();
/// modified.extend_from_slice(b" and then some");
///
/// let index = LocalIndex::build(&build_tree(Cursor::new(&original), config)?)?;
/// let delta = DeltaGenerator::new(config)?.generate(Cursor::new(&modified), &index)?;
///
/// let mut rebuilt = Vec::new();
/// apply_delta(Cursor::new(&original), &delta.ops, &mut rebuilt)?;
/// assert_eq!(rebuilt, modified);
/// # Ok::<(), chunkdiff::ChunkError>(())
/// ```
pub fn apply_delta<'a, B, W, I>(mut basis: B, ops: I, mut out: W) -> Result<u64, ChunkError>
where
    B: Read + Seek,
    W: Write,
    I: IntoIterator<Item = &'a DeltaOp>,
{
    let mut buffer = Buffer::take();
    let mut written = 0u64;

    for op in ops {
        match op {
            DeltaOp::Literal(data) => out.write_all(data)?,
            DeltaOp::Copy { hash, offset, len } => {
                basis.seek(SeekFrom::Start(*offset))?;

                let mut hasher = Blake3Hasher::new();
                let mut remaining = *len;
                while remaining > 0 {
                    let slice = buffer.as_mut_slice();
                    let want = remaining.min(slice.len() as u64) as usize;
                    match basis.read_exact(&mut slice[..want]) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                            return Err(ChunkError::CopyOutOfBounds {
                                offset: *offset,
                                len: *len,
                            });
                        }
                        Err(e) => return Err(e.into()),
                    }
                    let filled = buffer.filled(want);
                    hasher.update(filled);
                    out.write_all(filled)?;
                    remaining -= want as u64;
                }

                if hasher.finalize() != *hash {
                    return Err(ChunkError::HashMismatch { offset: *offset });
                }
            }
        }
        written += op.output_len();
    }

    out.flush()?;
    debug!(bytes = written, "applied delta");
    Ok(written)
}
