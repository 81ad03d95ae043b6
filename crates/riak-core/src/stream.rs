//! Chunk handoff between a transport thread and a consuming thread
//!
//! A bounded single-producer/single-consumer queue. The producer is whatever
//! thread the transport uses to read chunks off the network; the consumer is
//! the caller's thread pulling entries through an iterator.
//!
//! - The queue holds at most `capacity` chunks; `ChunkSender::send` blocks
//!   while it is full, so memory is bounded by in-flight reads rather than
//!   by result size.
//! - Completion is explicit. A producer that goes away without calling
//!   `complete` or `fail` surfaces as `StreamAborted`, never as a clean end.
//! - Dropping the receiver cancels the stream: pending and future sends fail
//!   with `Cancelled` and `ChunkSender::is_cancelled` turns true, so the
//!   producer thread can exit.

use crate::errors::{RiakError, RiakResult};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

/// Message travelling from producer to consumer
#[derive(Debug)]
pub enum StreamEvent<C> {
    /// A batch of results
    Chunk(C),
    /// No more chunks will follow
    Complete,
    /// The operation failed; no more chunks will follow
    Failed(RiakError),
}

/// Create a bounded chunk channel
///
/// A capacity of zero is raised to one.
pub fn chunk_channel<C>(capacity: usize) -> (ChunkSender<C>, ChunkReceiver<C>) {
    let (events_tx, events_rx) = channel::bounded(capacity.max(1));
    let (cancel_tx, cancel_rx) = channel::bounded::<()>(0);
    let (interrupt_tx, interrupt_rx) = channel::bounded(1);
    (
        ChunkSender {
            events: Some(events_tx),
            cancelled: cancel_rx,
        },
        ChunkReceiver {
            events: events_rx,
            _cancel_guard: cancel_tx,
            interrupt_tx,
            interrupt_rx,
            finished: false,
        },
    )
}

/// Producer half, owned by the transport
#[derive(Debug)]
pub struct ChunkSender<C> {
    events: Option<Sender<StreamEvent<C>>>,
    // Never carries a message; disconnects when the receiver is dropped.
    cancelled: Receiver<()>,
}

impl<C> ChunkSender<C> {
    /// Deliver a chunk, blocking while the queue is full
    pub fn send(&self, chunk: C) -> RiakResult<()> {
        let events = self.events.as_ref().ok_or(RiakError::Cancelled)?;
        events
            .send(StreamEvent::Chunk(chunk))
            .map_err(|_| RiakError::Cancelled)
    }

    /// Signal that no more chunks follow
    pub fn complete(mut self) -> RiakResult<()> {
        self.finish(StreamEvent::Complete)
    }

    /// Signal that the operation failed
    pub fn fail(mut self, error: RiakError) -> RiakResult<()> {
        self.finish(StreamEvent::Failed(error))
    }

    /// Whether the consumer has abandoned the stream
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cancelled.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Block until the consumer abandons the stream or `timeout` elapses.
    ///
    /// Returns whether the stream was cancelled.
    pub fn wait_cancelled(&self, timeout: Duration) -> bool {
        matches!(
            self.cancelled.recv_timeout(timeout),
            Err(channel::RecvTimeoutError::Disconnected)
        )
    }

    fn finish(&mut self, event: StreamEvent<C>) -> RiakResult<()> {
        let events = self.events.take().ok_or(RiakError::Cancelled)?;
        events.send(event).map_err(|_| RiakError::Cancelled)
    }
}

/// Handle that aborts a blocked [`ChunkReceiver::recv_timeout`]
///
/// An interrupt raised while nobody is waiting is delivered to the next wait.
#[derive(Debug, Clone)]
pub struct StreamInterrupt {
    tx: Sender<()>,
}

impl StreamInterrupt {
    /// Interrupt the current or next wait
    pub fn interrupt(&self) {
        // A full slot means an interrupt is already pending.
        let _ = self.tx.try_send(());
    }
}

/// Consumer half
#[derive(Debug)]
pub struct ChunkReceiver<C> {
    events: Receiver<StreamEvent<C>>,
    _cancel_guard: Sender<()>,
    interrupt_tx: Sender<()>,
    interrupt_rx: Receiver<()>,
    finished: bool,
}

impl<C> ChunkReceiver<C> {
    /// Wait up to `timeout` for the next chunk.
    ///
    /// - `Ok(Some(chunk))` for a chunk, in arrival order
    /// - `Ok(None)` once the producer has completed; repeated calls keep
    ///   returning `Ok(None)`
    /// - `Err(StreamTimeout)` if nothing arrived in time; the stream stays
    ///   usable and the caller may wait again
    /// - `Err(Interrupted)` if an interrupt was raised
    /// - the producer's error if it failed, `StreamAborted` if it vanished
    pub fn recv_timeout(&mut self, timeout: Duration) -> RiakResult<Option<C>> {
        if self.finished {
            return Ok(None);
        }

        crossbeam::select! {
            recv(self.events) -> event => match event {
                Ok(StreamEvent::Chunk(chunk)) => Ok(Some(chunk)),
                Ok(StreamEvent::Complete) => {
                    self.finished = true;
                    Ok(None)
                }
                Ok(StreamEvent::Failed(error)) => {
                    self.finished = true;
                    Err(error)
                }
                Err(_) => {
                    self.finished = true;
                    tracing::warn!("chunk producer went away without completing the stream");
                    Err(RiakError::aborted("producer dropped before completion"))
                }
            },
            recv(self.interrupt_rx) -> _ => {
                tracing::warn!("chunk wait interrupted");
                Err(RiakError::Interrupted)
            },
            default(timeout) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(timeout_ms, "timed out waiting for chunk");
                Err(RiakError::stream_timeout(timeout))
            },
        }
    }

    /// Handle for interrupting waits from another thread
    pub fn interrupt_handle(&self) -> StreamInterrupt {
        StreamInterrupt {
            tx: self.interrupt_tx.clone(),
        }
    }

    /// Whether completion or failure has been observed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of chunks queued and not yet received
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}
