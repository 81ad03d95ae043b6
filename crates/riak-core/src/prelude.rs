//! Riak core prelude.
//!
//! Curated re-exports for command crates and applications.

pub use crate::{
    BinaryValue, CausalContext, ClientConfig, CoreOperation, CoreResponse, CrdtElement, DtOp,
    FieldRef, FieldType, Location, Namespace, Quorum, RiakCluster, RiakError, RiakResult,
    StreamingConfig, StreamingFuture,
};
