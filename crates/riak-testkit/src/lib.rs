//! # Riak Testkit - Layer 3: Testing
//!
//! **Purpose**: Test infrastructure for the Riak client crates.
//!
//! Provides an in-memory [`MockCluster`] that simulates a single Riak node
//! (datatypes, secondary indexes, paging and streaming), scripted chunk
//! producers for driving streaming consumers directly, and a once-only
//! tracing subscriber for tests.
//!
//! # Architecture Constraints
//!
//! - YES Simulated cluster behind the `RiakCluster` trait
//! - YES Scripted producers on dedicated threads
//! - YES Fault injection hooks
//! - NO network I/O
//! - NO use from production code

#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Simulated cluster
pub mod cluster;

/// Simulated datatype storage
pub mod datatypes;

/// Simulated secondary index storage
pub mod indexes;

/// Chunk producers
pub mod producer;

/// Test tracing setup
pub mod tracing_init;

pub use cluster::MockCluster;
pub use indexes::{BUCKET_INDEX, KEY_INDEX};
pub use producer::{ProducerTracker, ScriptStep, ScriptedProducer, StreamBehavior};
pub use tracing_init::init_test_tracing;
