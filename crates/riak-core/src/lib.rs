//! # Riak Core - Layer 1: Foundation
//!
//! **Purpose**: Wire model and transport boundary shared by the command crates.
//!
//! # Architecture Constraints
//!
//! - YES Byte values, namespaces, locations, causal contexts, quorum values
//! - YES CRDT operation tree and the element tagged union returned by the server
//! - YES Core operation/response shapes and their codec
//! - YES Bounded chunk handoff used by streaming queries
//! - YES The `RiakCluster` trait the commands execute against
//! - NO connection pooling, retries or load balancing (that is the cluster implementation)
//! - NO command builders (that is `riak-datatypes` and `riak-indexes`)

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Immutable byte strings
pub mod binary;

/// Cluster trait and streaming handle
pub mod cluster;

/// Operation/response codec
pub mod codec;

/// Client configuration
pub mod config;

/// Causal context
pub mod context;

/// CRDT operation tree and elements
pub mod crdt;

/// Unified error type
pub mod errors;

/// Namespaces and locations
pub mod location;

/// Core operations and responses
pub mod operations;

/// Curated re-exports
pub mod prelude;

/// Quorum values
pub mod quorum;

/// Bounded chunk channel
pub mod stream;

pub use binary::BinaryValue;
pub use cluster::{RiakCluster, StreamingFuture};
pub use config::{ClientConfig, StreamingConfig};
pub use context::CausalContext;
pub use crdt::{CrdtElement, DtOp, FieldRef, FieldType};
pub use errors::{RiakError, RiakResult};
pub use location::{Location, Namespace, DEFAULT_BUCKET_TYPE};
pub use operations::{
    CoreOperation, CoreResponse, DtFetchRequest, DtFetchResponse, DtUpdateRequest,
    DtUpdateResponse, IndexChunk, IndexCriteria, IndexEntry, IndexQueryRequest,
};
pub use quorum::Quorum;
pub use stream::{chunk_channel, ChunkReceiver, ChunkSender, StreamEvent, StreamInterrupt};
