//! Chunk producers for streaming tests
//!
//! Producers run on their own threads, standing in for the transport thread
//! that reads chunks off a connection. Every producer exits once the
//! consumer drops its end of the stream.

use riak_core::{chunk_channel, ChunkReceiver, ChunkSender, RiakError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Poll interval used while a stalled producer waits to be abandoned.
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// How the simulated cluster delivers streaming results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamBehavior {
    /// Deliver every result in chunks of `chunk_size`, then complete
    Deliver {
        /// Entries per chunk
        chunk_size: usize,
    },
    /// Deliver the first `chunks` chunks, then go silent until abandoned
    StallAfter {
        /// Chunks delivered before stalling
        chunks: usize,
        /// Entries per chunk
        chunk_size: usize,
    },
    /// Deliver the first `chunks` chunks, then report `error`
    FailAfter {
        /// Chunks delivered before failing
        chunks: usize,
        /// Entries per chunk
        chunk_size: usize,
        /// Failure reported to the consumer
        error: RiakError,
    },
}

impl Default for StreamBehavior {
    fn default() -> Self {
        Self::Deliver { chunk_size: 2 }
    }
}

impl StreamBehavior {
    /// Entries per chunk
    pub fn chunk_size(&self) -> usize {
        match self {
            Self::Deliver { chunk_size }
            | Self::StallAfter { chunk_size, .. }
            | Self::FailAfter { chunk_size, .. } => (*chunk_size).max(1),
        }
    }
}

/// One step of a scripted producer
#[derive(Debug, Clone)]
pub enum ScriptStep<C> {
    /// Send a chunk
    Chunk(C),
    /// Pause before the next step
    Sleep(Duration),
    /// Signal completion and stop
    Complete,
    /// Signal failure and stop
    Fail(RiakError),
    /// Stop without signalling anything
    Abort,
    /// Go silent until the consumer abandons the stream
    Stall,
}

/// Count of producer threads still running
#[derive(Debug, Clone, Default)]
pub struct ProducerTracker {
    active: Arc<AtomicUsize>,
}

impl ProducerTracker {
    /// Number of producers that have not exited
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until every producer has exited, up to `timeout`
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        // An unrepresentable deadline waits without bound.
        let deadline = Instant::now().checked_add(timeout);
        while self.active() > 0 {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }

    fn enter(&self) -> ActiveGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ActiveGuard {
            active: Arc::clone(&self.active),
        }
    }
}

struct ActiveGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Producer thread driven by a fixed script
#[derive(Debug)]
pub struct ScriptedProducer {
    handle: JoinHandle<()>,
}

impl ScriptedProducer {
    /// Start a producer running `script` and return it with the consumer half
    pub fn spawn<C: Send + 'static>(
        capacity: usize,
        script: Vec<ScriptStep<C>>,
    ) -> (Self, ChunkReceiver<C>) {
        Self::spawn_tracked(capacity, script, &ProducerTracker::default())
    }

    /// Like [`spawn`](Self::spawn), registering the thread with `tracker`
    pub fn spawn_tracked<C: Send + 'static>(
        capacity: usize,
        script: Vec<ScriptStep<C>>,
        tracker: &ProducerTracker,
    ) -> (Self, ChunkReceiver<C>) {
        let (tx, rx) = chunk_channel(capacity);
        let guard = tracker.enter();
        let handle = thread::spawn(move || {
            let _guard = guard;
            run_script(tx, script);
        });
        (Self { handle }, rx)
    }

    /// Wait for the producer thread to exit
    pub fn join(self) -> bool {
        self.handle.join().is_ok()
    }

    /// Whether the producer thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

fn run_script<C>(tx: ChunkSender<C>, script: Vec<ScriptStep<C>>) {
    for step in script {
        match step {
            ScriptStep::Chunk(chunk) => {
                if tx.send(chunk).is_err() {
                    tracing::debug!("consumer abandoned scripted stream");
                    return;
                }
            }
            ScriptStep::Sleep(pause) => {
                if tx.wait_cancelled(pause) {
                    return;
                }
            }
            ScriptStep::Complete => {
                let _ = tx.complete();
                return;
            }
            ScriptStep::Fail(error) => {
                let _ = tx.fail(error);
                return;
            }
            ScriptStep::Abort => return,
            ScriptStep::Stall => {
                stall(&tx);
                return;
            }
        }
    }
    // Running off the end of the script is an abort.
}

fn stall<C>(tx: &ChunkSender<C>) {
    while !tx.wait_cancelled(CANCEL_POLL) {}
}

/// Build the script the simulated cluster plays for a streaming query
pub(crate) fn script_for<C>(
    chunks: Vec<C>,
    behavior: &StreamBehavior,
) -> Vec<ScriptStep<C>> {
    let mut steps: Vec<ScriptStep<C>> = Vec::with_capacity(chunks.len() + 1);
    match behavior {
        StreamBehavior::Deliver { .. } => {
            steps.extend(chunks.into_iter().map(ScriptStep::Chunk));
            steps.push(ScriptStep::Complete);
        }
        StreamBehavior::StallAfter { chunks: n, .. } => {
            steps.extend(chunks.into_iter().take(*n).map(ScriptStep::Chunk));
            steps.push(ScriptStep::Stall);
        }
        StreamBehavior::FailAfter { chunks: n, error, .. } => {
            steps.extend(chunks.into_iter().take(*n).map(ScriptStep::Chunk));
            steps.push(ScriptStep::Fail(error.clone()));
        }
    }
    steps
}
