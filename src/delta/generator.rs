//! Streaming delta generation against a chunk index.
//!
//! The modified stream is chunked with the same configuration as the
//! original. Every chunk the index knows becomes a `Copy`; runs of unknown
//! chunks are gathered into a single `Literal` that is flushed before the
//! next `Copy`, when it would exceed `max_literal_size`, or at end of
//! stream.

use std::convert::Infallible;
use std::io::Read;
use std::ops::ControlFlow;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use super::{Delta, DeltaOp, DeltaStats};
use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::index::ChunkLookup;

/// Produces `Copy`/`Literal` instruction sequences.
///
/// The generator holds only configuration; one instance can drive any
/// number of runs, on any number of threads, against a shared index.
///
/// # Example
///
/// ```
/// use chunkdiff::{build_tree, ChunkConfig, DeltaGenerator, LocalIndex};
/// use std::io::Cursor;
///
/// let config = ChunkConfig::new(64, 256, 1024)?;
/// let original = vec![5u8; 10_000];
/// let index = LocalIndex::build(&build_tree(Cursor::new(&original), config)?)?;
///
/// let delta = DeltaGenerator::new(config)?.generate(Cursor::new(&original), &index)?;
/// assert_eq!(delta.stats.literal_bytes, 0);
/// assert_eq!(delta.output_len(), 10_000);
/// # Ok::<(), chunkdiff::ChunkError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaGenerator {
    config: ChunkConfig,
}

impl DeltaGenerator {
    /// Creates a generator. `config` must match the one the index's tree
    /// was built with, or nothing will line up.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` fails
    /// [`ChunkConfig::validate`].
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Reads `modified` to the end and collects its delta.
    ///
    /// # Errors
    ///
    /// An I/O error aborts the run; no partial delta is returned.
    pub fn generate<R, L>(&self, modified: R, index: &L) -> Result<Delta, ChunkError>
    where
        R: Read,
        L: ChunkLookup + ?Sized,
    {
        let mut ops = Vec::new();
        let stats = self.generate_with(modified, index, |op| {
            ops.push(op);
            ControlFlow::Continue(())
        })?;
        Ok(Delta { ops, stats })
    }

    /// Delta of an in-memory buffer. Same result as [`generate`](Self::generate)
    /// over a reader of the same bytes.
    pub fn generate_bytes<L>(&self, modified: impl Into<Bytes>, index: &L) -> Delta
    where
        L: ChunkLookup + ?Sized,
    {
        let chunks = Chunker::new(self.config).chunk_bytes(modified);
        let mut ops = Vec::new();
        let Ok(stats) = self.drive(chunks.into_iter().map(Ok::<_, Infallible>), index, |op| {
            ops.push(op);
            ControlFlow::Continue(())
        });
        Delta { ops, stats }
    }

    /// Streams each instruction to `sink` as soon as it is final.
    ///
    /// Returning [`ControlFlow::Break`] from the sink stops the run; the
    /// instructions delivered so far are a valid prefix of the full delta
    /// and the returned stats have `cancelled` set.
    ///
    /// # Errors
    ///
    /// An I/O error aborts the run. Instructions already delivered to the
    /// sink must then be discarded.
    pub fn generate_with<R, L, F>(
        &self,
        modified: R,
        index: &L,
        sink: F,
    ) -> Result<DeltaStats, ChunkError>
    where
        R: Read,
        L: ChunkLookup + ?Sized,
        F: FnMut(DeltaOp) -> ControlFlow<()>,
    {
        self.drive(Chunker::new(self.config).chunk(modified), index, sink)
    }

    /// Runs the chunks of one modified stream through a [`DeltaRun`].
    fn drive<I, E, L, F>(&self, chunks: I, index: &L, sink: F) -> Result<DeltaStats, E>
    where
        I: IntoIterator<Item = Result<Chunk, E>>,
        L: ChunkLookup + ?Sized,
        F: FnMut(DeltaOp) -> ControlFlow<()>,
    {
        let mut run = DeltaRun::new(self.config.max_literal_size(), sink);

        for chunk in chunks {
            if run.on_chunk(chunk?, index).is_break() {
                run.stats.cancelled = true;
                debug!(emitted = run.stats.copy_ops + run.stats.literal_ops, "delta run cancelled");
                return Ok(run.stats);
            }
        }
        if run.flush().is_break() {
            run.stats.cancelled = true;
        }

        let stats = run.stats;
        debug!(
            copies = stats.copy_ops,
            copy_bytes = stats.copy_bytes,
            literals = stats.literal_ops,
            literal_bytes = stats.literal_bytes,
            "generated delta"
        );
        Ok(stats)
    }
}

/// State of one delta run: the literal accumulator and counters.
struct DeltaRun<F> {
    sink: F,
    literal: BytesMut,
    max_literal: usize,
    stats: DeltaStats,
}

impl<F> DeltaRun<F>
where
    F: FnMut(DeltaOp) -> ControlFlow<()>,
{
    fn new(max_literal: usize, sink: F) -> Self {
        Self {
            sink,
            literal: BytesMut::new(),
            max_literal,
            stats: DeltaStats::default(),
        }
    }

    fn emit(&mut self, op: DeltaOp) -> ControlFlow<()> {
        self.stats.record(&op);
        (self.sink)(op)
    }

    fn flush(&mut self) -> ControlFlow<()> {
        if self.literal.is_empty() {
            return ControlFlow::Continue(());
        }
        let data = self.literal.split().freeze();
        self.emit(DeltaOp::Literal(data))
    }

    fn on_chunk<L>(&mut self, chunk: Chunk, index: &L) -> ControlFlow<()>
    where
        L: ChunkLookup + ?Sized,
    {
        let len = chunk.len() as u64;

        // A hit whose length disagrees cannot be the same content.
        match index.lookup(&chunk.hash).filter(|meta| meta.length == len) {
            Some(meta) => {
                trace!(offset = chunk.offset, len, source = meta.offset, "copy");
                if self.flush().is_break() {
                    return ControlFlow::Break(());
                }
                self.emit(DeltaOp::Copy {
                    hash: chunk.hash,
                    offset: meta.offset,
                    len,
                })
            }
            None => {
                trace!(offset = chunk.offset, len, "literal");
                if self.literal.len() + chunk.len() > self.max_literal && self.flush().is_break() {
                    return ControlFlow::Break(());
                }
                self.literal.extend_from_slice(&chunk.data);
                ControlFlow::Continue(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ChunkMeta, LocalIndex};
    use crate::tree::build_tree;
    use std::io::Cursor;

    fn config() -> ChunkConfig {
        ChunkConfig::new(16, 64, 256).unwrap()
    }

    fn generator() -> DeltaGenerator {
        DeltaGenerator::new(config()).unwrap()
    }

    fn noise(len: usize, mut seed: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                seed as u8
            })
            .collect()
    }

    fn index_of(data: &[u8]) -> LocalIndex {
        LocalIndex::build(&build_tree(Cursor::new(data), config()).unwrap()).unwrap()
    }

    struct Nothing;

    impl ChunkLookup for Nothing {
        fn lookup(&self, _: &crate::chunk::ChunkHash) -> Option<ChunkMeta> {
            None
        }
    }

    #[test]
    fn test_unmodified_stream_is_all_copies() {
        let data = noise(20_000, 1);
        let delta = generator()
            .generate(Cursor::new(&data), &index_of(&data))
            .unwrap();

        assert!(delta.ops.iter().all(DeltaOp::is_copy));
        assert_eq!(delta.stats.copy_bytes, 20_000);
        assert!(!delta.stats.cancelled);
    }

    #[test]
    fn test_misses_coalesce_into_one_literal() {
        let data = noise(5_000, 2);
        let delta = generator().generate_bytes(data.clone(), &Nothing);

        assert_eq!(delta.ops, vec![DeltaOp::Literal(Bytes::from(data))]);
    }

    #[test]
    fn test_literal_is_capped() {
        let config = config().with_max_literal_size(1024);
        let data = noise(10_000, 3);
        let delta = DeltaGenerator::new(config).unwrap().generate_bytes(data, &Nothing);

        assert!(delta.stats.literal_ops > 1);
        assert!(delta.literals().all(|lit| lit.len() <= 1024));
        assert_eq!(delta.stats.literal_bytes, 10_000);
    }

    #[test]
    fn test_length_mismatch_is_a_miss() {
        struct Liar;
        impl ChunkLookup for Liar {
            fn lookup(&self, _: &crate::chunk::ChunkHash) -> Option<ChunkMeta> {
                Some(ChunkMeta {
                    order: 0,
                    offset: 0,
                    length: 1,
                })
            }
        }

        let delta = generator().generate_bytes(noise(2_000, 4), &Liar);
        assert_eq!(delta.stats.copy_ops, 0);
    }

    #[test]
    fn test_cancel_leaves_valid_prefix() {
        let data = noise(20_000, 5);
        let index = index_of(&data);
        let generator = generator();
        let full = generator.generate(Cursor::new(&data), &index).unwrap();

        let mut prefix = Vec::new();
        let stats = generator
            .generate_with(Cursor::new(&data), &index, |op| {
                prefix.push(op);
                if prefix.len() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(prefix.len(), 3);
        assert_eq!(prefix[..], full.ops[..3]);
    }

    #[test]
    fn test_generate_bytes_matches_reader() {
        let original = noise(15_000, 6);
        let mut modified = original.clone();
        modified.splice(7_000..7_010, noise(40, 7));
        let index = index_of(&original);
        let generator = generator();

        let from_reader = generator.generate(Cursor::new(&modified), &index).unwrap();
        let from_bytes = generator.generate_bytes(modified, &index);
        assert_eq!(from_reader, from_bytes);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = DeltaGenerator::new(config().with_fanout_bits(0)).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfig { .. }));
    }

    #[test]
    fn test_in_memory_run_honours_cancel() {
        let data = noise(20_000, 8);
        let index = index_of(&data);
        let generator = generator();
        let chunks = Chunker::new(config()).chunk_bytes(data);

        let mut seen = 0;
        let Ok(stats) = generator.drive(chunks.into_iter().map(Ok::<_, Infallible>), &index, |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert!(stats.cancelled);
        assert_eq!(seen, 2);
        assert_eq!(stats.copy_ops + stats.literal_ops, 2);
    }
}
