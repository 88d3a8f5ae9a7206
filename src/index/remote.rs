//! Request/response index answered by a remote holder of the tree.
//!
//! The transport layer owns the receiving end of the request channel: it
//! forwards each [`LookupRequest`] to wherever the original tree lives and
//! answers with [`LookupRequest::respond`]. A lookup that is not answered
//! within the configured timeout, or whose provider has gone away, is
//! logged and reported as absent. The delta run then emits literals for
//! that chunk, which costs bandwidth but never correctness.
//!
//! Every request carries the deadline of its caller. Servers should skip
//! requests that are already expired instead of asking the provider.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use tracing::{trace, warn};

use super::{ChunkLookup, ChunkMeta};
use crate::chunk::ChunkHash;
use crate::config::LookupConfig;
use crate::error::ChunkError;

/// A pending lookup waiting for the remote side's answer.
#[derive(Debug)]
pub struct LookupRequest {
    hash: ChunkHash,
    deadline: Option<Instant>,
    reply: Sender<Option<ChunkMeta>>,
}

impl LookupRequest {
    /// The hash being looked up.
    pub fn hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// When the requester stops waiting, if the timeout was representable.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the requester has stopped waiting for an answer.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Answers the request. Returns false if the requester already gave up.
    pub fn respond(self, meta: Option<ChunkMeta>) -> bool {
        self.reply.send(meta).is_ok()
    }
}

/// Lazy [`ChunkLookup`] backed by a request channel.
///
/// Cloning is cheap; all clones feed the same provider. Each lookup blocks
/// only its calling thread.
///
/// # Example
///
/// ```
/// use chunkdiff::{ChunkHash, ChunkLookup, ChunkMeta, LookupConfig, RemoteIndex};
///
/// let known = ChunkHash::new([1; 32]);
/// let index = RemoteIndex::serve(
///     move |hash| (*hash == known).then_some(ChunkMeta { order: 0, offset: 0, length: 10 }),
///     LookupConfig::default(),
/// )?;
///
/// assert!(index.lookup(&known).is_some());
/// assert!(index.lookup(&ChunkHash::new([2; 32])).is_none());
/// # Ok::<(), chunkdiff::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RemoteIndex {
    requests: Sender<LookupRequest>,
    config: LookupConfig,
}

impl RemoteIndex {
    /// Creates an index and the request stream a transport must serve.
    pub fn channel(config: LookupConfig) -> (Self, Receiver<LookupRequest>) {
        let (requests, incoming) = unbounded();
        (Self { requests, config }, incoming)
    }

    /// Serves lookups from `provider` on [`LookupConfig::workers`] threads.
    ///
    /// A slow answer occupies one worker only. Requests whose caller has
    /// already timed out are dropped without calling `provider`. The workers
    /// exit once every clone of the returned index is dropped.
    pub fn serve<F>(provider: F, config: LookupConfig) -> Result<Self, ChunkError>
    where
        F: Fn(&ChunkHash) -> Option<ChunkMeta> + Send + Sync + 'static,
    {
        let (index, incoming) = Self::channel(config);
        let provider = Arc::new(provider);

        for id in 0..config.workers() {
            let incoming = incoming.clone();
            let provider = Arc::clone(&provider);
            thread::Builder::new()
                .name(format!("chunkdiff-lookup-{id}"))
                .spawn(move || {
                    for request in incoming {
                        if request.is_expired() {
                            trace!(hash = %request.hash().short(), "skipping expired lookup");
                            continue;
                        }
                        let meta = provider(request.hash());
                        request.respond(meta);
                    }
                })?;
        }
        Ok(index)
    }

    /// The lookup configuration.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }
}

impl ChunkLookup for RemoteIndex {
    fn lookup(&self, hash: &ChunkHash) -> Option<ChunkMeta> {
        let (reply, response) = bounded(1);
        let request = LookupRequest {
            hash: *hash,
            deadline: Instant::now().checked_add(self.config.timeout()),
            reply,
        };

        if self.requests.send(request).is_err() {
            warn!(hash = %hash.short(), "lookup provider is gone, treating chunk as absent");
            return None;
        }

        match response.recv_timeout(self.config.timeout()) {
            Ok(meta) => {
                trace!(hash = %hash.short(), found = meta.is_some(), "remote lookup");
                meta
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    hash = %hash.short(),
                    timeout_ms = self.config.timeout().as_millis() as u64,
                    "remote lookup timed out, treating chunk as absent"
                );
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(hash = %hash.short(), "remote lookup dropped without an answer");
                None
            }
        }
    }
}
