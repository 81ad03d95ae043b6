//! # Riak Datatypes - Layer 2: Domain
//!
//! **Purpose**: Client-side CRDT updates, typed views and the fetch/update
//! commands for Riak datatypes.
//!
//! Updates are plain values that compile to the operation tree in
//! `riak-core`. Commands pair an update (or a location, for fetches) with a
//! closed set of options and adapt the cluster's raw response into a typed
//! view.
//!
//! # Architecture Constraints
//!
//! - YES Update descriptors for counters, sets, gsets, maps, registers, flags and HLLs
//! - YES Typed views of server values
//! - YES Fetch/update command templates over a datatype kind
//! - NO merging of values on the client (the server owns merge semantics)
//! - NO transport or connection handling (that is the `RiakCluster` implementation)

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Fetch and update commands
pub mod command;

/// Datatype kinds binding updates to views
pub mod kind;

/// Closed option sets for the commands
pub mod options;

/// Curated re-exports
pub mod prelude;

/// Update descriptors
pub mod update;

/// Typed views of server values
pub mod view;

pub use command::{
    FetchCounter, FetchDatatype, FetchGSet, FetchHll, FetchMap, FetchResponse, FetchSet,
    UpdateCounter, UpdateDatatype, UpdateGSet, UpdateHll, UpdateMap, UpdateResponse, UpdateSet,
    UpdateTarget,
};
pub use kind::DatatypeKind;
pub use options::{FetchOption, FetchOptionKind, UpdateOption, UpdateOptionKind};
pub use update::{
    CounterUpdate, DatatypeUpdate, FieldUpdate, FlagUpdate, GSetUpdate, HllUpdate, MapUpdate,
    RegisterUpdate, SetUpdate,
};
pub use view::{
    RiakCounter, RiakDatatype, RiakFlag, RiakGSet, RiakHll, RiakMap, RiakRegister, RiakSet,
};
