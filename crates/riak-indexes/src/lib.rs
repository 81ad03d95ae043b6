//! # Riak Indexes - Layer 2: Domain
//!
//! **Purpose**: Secondary index (2i) queries with single-shot and streaming
//! execution.
//!
//! Queries are typed by an index key converter, so an `_int` query takes and
//! returns integers while the wire carries their decimal ASCII form.
//! Streaming execution hands results to a blocking pull iterator whose every
//! wait is bounded.
//!
//! # Architecture Constraints
//!
//! - YES Index key converters (raw, string, 64-bit and big integer)
//! - YES Query builders with build-time validation
//! - YES Materialized and streaming responses
//! - YES `ChunkedResponseIterator` over any chunk source
//! - NO query planning or coverage computation (the server owns both)
//! - NO transport or connection handling (that is the `RiakCluster` implementation)

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Index key converters
pub mod converter;

/// Curated re-exports
pub mod prelude;

/// Query builders and execution
pub mod query;

/// Query responses
pub mod response;

/// Streaming result iterator
pub mod streaming;

pub use converter::{BigIntConverter, IndexConverter, IntConverter, RawConverter, StringConverter};
pub use query::{
    BigIntIndexQuery, BinIndexQuery, BucketIndexQuery, IndexQuery, IndexQueryBuilder,
    IntIndexQuery, KeyIndexQuery, RawIndexQuery, BUCKET_INDEX, KEY_INDEX,
};
pub use response::{Entry, EntrySplitter, IndexEntryIterator, IndexResponse};
pub use streaming::{ChunkSplitter, ChunkedResponseIterator, FnSplitter, PlainChunks};
