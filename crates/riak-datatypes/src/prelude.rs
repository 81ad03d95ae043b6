//! Riak datatypes prelude.
//!
//! Everything needed to build, submit and read datatype commands.

pub use crate::{
    CounterUpdate, DatatypeKind, DatatypeUpdate, FetchCounter, FetchDatatype, FetchGSet,
    FetchHll, FetchMap, FetchOption, FetchResponse, FetchSet, FlagUpdate, GSetUpdate, HllUpdate,
    MapUpdate, RegisterUpdate, RiakCounter, RiakDatatype, RiakFlag, RiakGSet, RiakHll, RiakMap,
    RiakRegister, RiakSet, SetUpdate, UpdateCounter, UpdateDatatype, UpdateGSet, UpdateHll,
    UpdateMap, UpdateOption, UpdateResponse, UpdateSet,
};
pub use riak_core::prelude::*;
