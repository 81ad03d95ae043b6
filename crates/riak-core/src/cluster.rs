//! Cluster trait definitions
//!
//! The cluster owns connections, retries and load balancing. This crate only
//! defines the boundary: single-shot submission returns a future of the core
//! response; streaming submission returns a handle whose chunks are delivered
//! by a transport-owned thread.

use crate::config::StreamingConfig;
use crate::errors::RiakResult;
use crate::operations::{CoreOperation, CoreResponse, IndexChunk};
use crate::stream::{ChunkReceiver, StreamInterrupt};
use async_trait::async_trait;
use std::time::Duration;

/// Executor for core operations
#[async_trait]
pub trait RiakCluster: Send + Sync {
    /// Execute an operation and wait for its complete response
    async fn submit(&self, operation: CoreOperation) -> RiakResult<CoreResponse>;

    /// Start an operation whose results arrive as a series of chunks.
    ///
    /// The returned handle is live immediately; chunks are pushed to it as
    /// they arrive. Dropping the handle cancels the stream.
    fn submit_streaming(&self, operation: CoreOperation) -> RiakResult<StreamingFuture<IndexChunk>>;

    /// Streaming parameters used when a caller does not supply its own
    fn streaming_config(&self) -> StreamingConfig {
        StreamingConfig::default()
    }
}

/// In-flight streaming operation
#[derive(Debug)]
pub struct StreamingFuture<C> {
    chunks: ChunkReceiver<C>,
}

impl<C> StreamingFuture<C> {
    /// Wrap the consumer half of a chunk channel
    pub fn new(chunks: ChunkReceiver<C>) -> Self {
        Self { chunks }
    }

    /// Wait for the next chunk; see [`ChunkReceiver::recv_timeout`]
    pub fn next_chunk(&mut self, timeout: Duration) -> RiakResult<Option<C>> {
        self.chunks.recv_timeout(timeout)
    }

    /// Whether the producer has finished
    pub fn is_done(&self) -> bool {
        self.chunks.is_finished()
    }

    /// Handle for interrupting a blocked wait
    pub fn interrupt_handle(&self) -> StreamInterrupt {
        self.chunks.interrupt_handle()
    }

    /// The underlying receiver
    pub fn into_receiver(self) -> ChunkReceiver<C> {
        self.chunks
    }
}
