//! Pull-based chunking over [`std::io::Read`].
//!
//! ```ignore
//! use chunkdiff::{Chunker, ChunkConfig};
//! use std::fs::File;
//!
//! let file = File::open("data.bin")?;
//!
//! for chunk in Chunker::new(ChunkConfig::default()).chunk(file) {
//!     let chunk = chunk?;
//!     println!("Chunk: {} bytes", chunk.len());
//! }
//! # Ok::<(), chunkdiff::ChunkError>(())
//! ```

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use super::Chunker;
use crate::buffer::Buffer;
use crate::chunk::Chunk;
use crate::error::ChunkError;

impl Chunker {
    /// Creates a chunking iterator over a reader.
    ///
    /// The reader is consumed sequentially and never seeked.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::{Chunker, ChunkConfig};
    /// use std::io::Cursor;
    ///
    /// let data = vec![3u8; 10_000];
    /// let chunks = Chunker::new(ChunkConfig::new(16, 64, 256)?)
    ///     .chunk(Cursor::new(&data))
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), data.len());
    /// # Ok::<(), chunkdiff::ChunkError>(())
    /// ```
    pub fn chunk<R: Read>(self, reader: R) -> ChunkIter<R> {
        ChunkIter::new(reader, self)
    }
}

/// An iterator that yields chunks from a reader.
///
/// Reads up to 64 KiB at a time into a pooled buffer. After an I/O error
/// the iterator yields the error once and then ends.
pub struct ChunkIter<R> {
    reader: R,
    chunker: Chunker,
    buffer: Buffer,
    ready: VecDeque<Chunk>,
    finished: bool,
}

impl<R: Read> ChunkIter<R> {
    fn new(reader: R, mut chunker: Chunker) -> Self {
        chunker.reset();
        Self {
            reader,
            chunker,
            buffer: Buffer::take(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Bytes of the stream consumed into chunks so far.
    pub fn offset(&self) -> u64 {
        self.chunker.offset()
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }

            match self.reader.read(self.buffer.as_mut_slice()) {
                Ok(0) => {
                    self.finished = true;
                    self.ready.extend(self.chunker.finish());
                }
                Ok(n) => {
                    let data = Bytes::copy_from_slice(self.buffer.filled(n));
                    self.ready.extend(self.chunker.push(data));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    self.ready.clear();
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkConfig;
    use std::io::Cursor;

    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::other("disk on fire"));
            }
            let n = buf.len().min(self.remaining).min(100);
            buf[..n].fill(0x5A);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_iterator_matches_chunk_bytes() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
        let chunker = Chunker::new(ChunkConfig::new(64, 256, 1024).unwrap());

        let expected = chunker.chunk_bytes(data.clone());
        let actual = chunker
            .chunk(Cursor::new(&data))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_empty_reader() {
        let mut iter = Chunker::default().chunk(Cursor::new(Vec::new()));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_io_error_is_surfaced_once() {
        let chunker = Chunker::new(ChunkConfig::new(16, 64, 256).unwrap());
        let results: Vec<_> = chunker.chunk(FailingReader { remaining: 1000 }).collect();

        let errors = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(errors, 1);
        assert!(matches!(results.last(), Some(Err(ChunkError::Io(_)))));
    }
}
