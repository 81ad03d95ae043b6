//! Streaming result iterator
//!
//! `ChunkedResponseIterator` pulls chunks from a [`ChunkReceiver`] and hands
//! out their entries one at a time. Each wait for a chunk is bounded by the
//! iterator's timeout (`Duration::MAX` waits without bound): a slow
//! producer surfaces as a `StreamTimeout` error, never as the end of the
//! results.
//!
//! ```text
//!                 chunk (non-empty)
//!  AwaitingChunk ------------------> Buffered
//!    |   ^  |                          |
//!    |   |  +-- chunk (empty) --+      | drained
//!    |   +----------------------+------+
//!    |
//!    +-- complete --> Exhausted
//!    +-- failure  --> Failed
//!    (timeout and interrupt leave the state unchanged)
//! ```

use riak_core::{BinaryValue, ChunkReceiver, RiakError, RiakResult, StreamInterrupt};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Splits a chunk into entries and its continuation
pub trait ChunkSplitter<C, E> {
    /// Take a chunk apart
    fn split(&mut self, chunk: C) -> (Vec<E>, Option<BinaryValue>);
}

/// Splitter for chunks that are already a list of entries
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainChunks;

impl<E> ChunkSplitter<Vec<E>, E> for PlainChunks {
    fn split(&mut self, chunk: Vec<E>) -> (Vec<E>, Option<BinaryValue>) {
        (chunk, None)
    }
}

/// Splitter backed by a closure
#[derive(Debug, Clone, Copy)]
pub struct FnSplitter<F>(pub F);

impl<C, E, F> ChunkSplitter<C, E> for FnSplitter<F>
where
    F: FnMut(C) -> (Vec<E>, Option<BinaryValue>),
{
    fn split(&mut self, chunk: C) -> (Vec<E>, Option<BinaryValue>) {
        (self.0)(chunk)
    }
}

#[derive(Debug)]
enum State<E> {
    AwaitingChunk,
    Buffered(VecDeque<E>),
    Exhausted,
    Failed(RiakError),
}

/// Blocking pull iterator over a chunked result stream
#[derive(Debug)]
pub struct ChunkedResponseIterator<C, S, E> {
    source: ChunkReceiver<C>,
    splitter: S,
    timeout: Duration,
    state: State<E>,
    continuation: Option<BinaryValue>,
    failure_reported: bool,
}

impl<C, S, E> ChunkedResponseIterator<C, S, E>
where
    S: ChunkSplitter<C, E>,
{
    /// Iterate `source`, waiting at most `timeout` in each [`has_next`](Self::has_next)
    pub fn new(source: ChunkReceiver<C>, timeout: Duration, splitter: S) -> Self {
        Self {
            source,
            splitter,
            timeout,
            state: State::AwaitingChunk,
            continuation: None,
            failure_reported: false,
        }
    }

    /// Bound on each wait for entries
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the bound on subsequent waits
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Whether another entry is available, waiting for one if needed.
    ///
    /// - `Ok(true)`: `next_entry` will return without blocking
    /// - `Ok(false)`: the producer completed and everything was consumed
    /// - `Err(StreamTimeout)`: nothing arrived within the timeout; calling
    ///   again resumes the wait
    /// - `Err(Interrupted)`: the wait was interrupted; calling again resumes
    /// - any other error is terminal and is returned on every later call
    pub fn has_next(&mut self) -> RiakResult<bool> {
        // Set on the first wait; `None` inside means the bound is unrepresentable.
        let mut deadline: Option<Option<Instant>> = None;
        loop {
            match &self.state {
                State::Buffered(entries) if !entries.is_empty() => return Ok(true),
                State::Buffered(_) => self.state = State::AwaitingChunk,
                State::Exhausted => return Ok(false),
                State::Failed(error) => return Err(error.clone()),
                State::AwaitingChunk => {
                    let deadline =
                        *deadline.get_or_insert_with(|| Instant::now().checked_add(self.timeout));
                    let wait = match deadline {
                        Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                        None => self.timeout,
                    };
                    match self.source.recv_timeout(wait) {
                        Ok(Some(chunk)) => self.accept(chunk),
                        Ok(None) => {
                            debug!("Chunked response exhausted");
                            self.state = State::Exhausted;
                        }
                        Err(error @ (RiakError::StreamTimeout { .. } | RiakError::Interrupted)) => {
                            // A timeout reports the configured bound, not the remainder.
                            return Err(if error.is_timeout() {
                                RiakError::stream_timeout(self.timeout)
                            } else {
                                error
                            });
                        }
                        Err(error) => {
                            self.state = State::Failed(error.clone());
                            return Err(error);
                        }
                    }
                }
            }
        }
    }

    /// The next entry, waiting for one if needed
    ///
    /// Fails with `NoSuchElement` once the stream is exhausted.
    pub fn next_entry(&mut self) -> RiakResult<E> {
        if !self.has_next()? {
            return Err(RiakError::NoSuchElement);
        }
        match &mut self.state {
            State::Buffered(entries) => entries.pop_front().ok_or(RiakError::NoSuchElement),
            _ => Err(RiakError::NoSuchElement),
        }
    }

    /// Whether every entry has been consumed and the producer completed
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    /// Whether a continuation is available; see [`continuation`](Self::continuation)
    pub fn has_continuation(&self) -> bool {
        self.continuation().is_some()
    }

    /// Continuation carried by the last chunk that had one
    ///
    /// Only reported once the iterator is exhausted; until then later chunks
    /// may still replace it, so `None` is returned.
    pub fn continuation(&self) -> Option<&BinaryValue> {
        if self.is_exhausted() {
            self.continuation.as_ref()
        } else {
            None
        }
    }

    /// Handle that interrupts a blocked [`has_next`](Self::has_next) from another thread
    pub fn interrupt_handle(&self) -> StreamInterrupt {
        self.source.interrupt_handle()
    }

    fn accept(&mut self, chunk: C) {
        let (entries, continuation) = self.splitter.split(chunk);
        trace!(
            entries = entries.len(),
            continuation = continuation.is_some(),
            "Received chunk"
        );
        if continuation.is_some() {
            self.continuation = continuation;
        }
        if !entries.is_empty() {
            self.state = State::Buffered(entries.into());
        }
    }
}

/// Yields `Ok(entry)` until the stream completes, then `None`.
///
/// A terminal failure is yielded once as `Some(Err(..))` and iteration ends.
/// A timeout or interrupt is yielded as `Some(Err(..))` without ending
/// iteration, so the next call waits again. Adapters that drop errors, such
/// as `filter_map(Result::ok)` or `count()`, therefore keep waiting for as
/// long as the producer stalls; stop on `RiakError::is_timeout` to bound
/// the total wait.
impl<C, S, E> Iterator for ChunkedResponseIterator<C, S, E>
where
    S: ChunkSplitter<C, E>,
{
    type Item = RiakResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failure_reported {
            return None;
        }
        match self.next_entry() {
            Ok(entry) => Some(Ok(entry)),
            Err(RiakError::NoSuchElement) => None,
            Err(error) => {
                self.failure_reported = matches!(self.state, State::Failed(_));
                Some(Err(error))
            }
        }
    }
}
