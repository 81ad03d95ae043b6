//! Datatype commands
//!
//! `FetchDatatype` and `UpdateDatatype` are generic over a [`DatatypeKind`],
//! which fixes both the update accepted and the view returned. A command is
//! an immutable value: executing it twice submits two identical operations.
//!
//! [`DatatypeKind`]: crate::kind::DatatypeKind

mod fetch;
mod update;

pub use fetch::{
    FetchCounter, FetchDatatype, FetchDatatypeBuilder, FetchGSet, FetchHll, FetchMap,
    FetchResponse, FetchSet,
};
pub use update::{
    UpdateCounter, UpdateDatatype, UpdateDatatypeBuilder, UpdateGSet, UpdateHll, UpdateMap,
    UpdateResponse, UpdateSet, UpdateTarget,
};

use riak_core::{CoreResponse, RiakError};

fn unexpected_response(expected: &str, actual: &CoreResponse) -> RiakError {
    RiakError::malformed(format!(
        "expected {expected} response, got {}",
        actual.name()
    ))
}
