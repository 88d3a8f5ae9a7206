//! Async stream adapter for chunking and tree building.
//!
//! Uses `futures_io::AsyncRead`, so it works with tokio (through
//! `tokio_util::compat`), async-std, smol or any futures-compatible runtime.

use std::collections::VecDeque;
use std::future::poll_fn;
use std::io::ErrorKind;
use std::pin::{Pin, pin};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::Buffer;
use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::tree::{HashTree, TreeBuilder};

pin_project! {
    /// A stream of hashed leaf chunks read from an async reader.
    ///
    /// Yields exactly the chunks [`Chunker::chunk`] yields for the same
    /// bytes. After an I/O error the stream yields the error once and ends.
    pub struct LeafStream<R> {
        #[pin]
        reader: R,
        chunker: Chunker,
        buffer: Buffer,
        ready: VecDeque<Chunk>,
        finished: bool,
    }
}

impl<R> LeafStream<R> {
    /// Creates a leaf stream over `reader`.
    pub fn new(reader: R, config: ChunkConfig) -> Self {
        Self {
            reader,
            chunker: Chunker::new(config),
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

impl<R: AsyncRead> Stream for LeafStream<R> {
    type Item = Result<Chunk, ChunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(chunk) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match this.reader.as_mut().poll_read(cx, this.buffer.as_mut_slice()) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(ChunkError::Io(e))));
                }
                Poll::Ready(Ok(0)) => {
                    *this.finished = true;
                    this.ready.extend(this.chunker.finish());
                }
                Poll::Ready(Ok(n)) => {
                    let data = Bytes::copy_from_slice(this.buffer.filled(n));
                    this.ready.extend(this.chunker.push(data));
                }
            }
        }
    }
}

/// Creates a leaf stream from an async reader.
///
/// For tokio readers, convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use chunkdiff::{chunk_async, ChunkConfig};
///
/// let file = tokio::fs::File::open("file").await?;
/// let stream = chunk_async(file.compat(), ChunkConfig::default());
/// ```
pub fn chunk_async<R: AsyncRead>(reader: R, config: ChunkConfig) -> LeafStream<R> {
    LeafStream::new(reader, config)
}

/// Reads `reader` to the end and builds its tree.
///
/// Produces the same tree as [`build_tree`](crate::build_tree) for the same
/// bytes.
///
/// # Errors
///
/// Any I/O error aborts the build; no partial tree is returned. An invalid
/// `config` is rejected before anything is read.
pub async fn build_tree_async<R: AsyncRead>(
    reader: R,
    config: ChunkConfig,
) -> Result<HashTree, ChunkError> {
    let mut builder = TreeBuilder::new(config)?;
    let mut leaves = pin!(LeafStream::new(reader, config));

    while let Some(chunk) = poll_fn(|cx| leaves.as_mut().poll_next(cx)).await {
        builder.add_chunk(&chunk?);
    }
    Ok(builder.finish())
}
