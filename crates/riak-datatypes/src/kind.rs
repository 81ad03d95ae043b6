//! Datatype kinds
//!
//! Marker types binding an update descriptor, its top-level operation and its
//! typed view. The command templates are generic over these markers, so
//! `FetchDatatype<Counter>` can only ever produce a `RiakCounter`.

use crate::update::{CounterUpdate, DatatypeUpdate, GSetUpdate, HllUpdate, MapUpdate, SetUpdate};
use crate::view::{RiakCounter, RiakGSet, RiakHll, RiakMap, RiakSet};
use riak_core::{CrdtElement, DtOp, RiakError, RiakResult};

/// A top-level datatype family
pub trait DatatypeKind: Send + Sync + 'static {
    /// Update descriptor accepted by update commands
    type Update: Clone + Send + Sync + std::fmt::Debug;
    /// Typed view produced by responses
    type View: Clone + Send + std::fmt::Debug;

    /// Name used in logs and errors
    const NAME: &'static str;

    /// Whether updates carry a causal context
    const CARRIES_CONTEXT: bool = true;

    /// Compile an update into a top-level operation
    fn to_op(update: &Self::Update) -> DtOp;

    /// Extract this kind's view; any other tag is a mismatch
    fn view_from_element(element: CrdtElement) -> RiakResult<Self::View>;

    /// View of a datatype that does not exist yet
    fn empty_view() -> Self::View;
}

fn mismatch<K: DatatypeKind>(element: &CrdtElement) -> RiakError {
    RiakError::mismatch(K::NAME, element.type_name())
}

/// Counter datatype
#[derive(Debug, Clone, Copy)]
pub struct Counter;

impl DatatypeKind for Counter {
    type Update = CounterUpdate;
    type View = RiakCounter;

    const NAME: &'static str = "counter";

    fn to_op(update: &CounterUpdate) -> DtOp {
        DtOp::Counter(update.to_op())
    }

    fn view_from_element(element: CrdtElement) -> RiakResult<RiakCounter> {
        match element {
            CrdtElement::Counter(value) => Ok(RiakCounter::new(value)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn empty_view() -> RiakCounter {
        RiakCounter::default()
    }
}

/// Observed-remove set datatype
#[derive(Debug, Clone, Copy)]
pub struct Set;

impl DatatypeKind for Set {
    type Update = SetUpdate;
    type View = RiakSet;

    const NAME: &'static str = "set";

    fn to_op(update: &SetUpdate) -> DtOp {
        DtOp::Set(update.to_op())
    }

    fn view_from_element(element: CrdtElement) -> RiakResult<RiakSet> {
        match element {
            CrdtElement::Set(members) => Ok(RiakSet::new(members)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn empty_view() -> RiakSet {
        RiakSet::default()
    }
}

/// Grow-only set datatype
#[derive(Debug, Clone, Copy)]
pub struct GSet;

impl DatatypeKind for GSet {
    type Update = GSetUpdate;
    type View = RiakGSet;

    const NAME: &'static str = "gset";

    fn to_op(update: &GSetUpdate) -> DtOp {
        DtOp::GSet(update.to_op())
    }

    fn view_from_element(element: CrdtElement) -> RiakResult<RiakGSet> {
        match element {
            CrdtElement::GSet(members) => Ok(RiakGSet::new(members)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn empty_view() -> RiakGSet {
        RiakGSet::default()
    }
}

/// Map datatype
#[derive(Debug, Clone, Copy)]
pub struct Map;

impl DatatypeKind for Map {
    type Update = MapUpdate;
    type View = RiakMap;

    const NAME: &'static str = "map";

    fn to_op(update: &MapUpdate) -> DtOp {
        DtOp::Map(update.to_op())
    }

    fn view_from_element(element: CrdtElement) -> RiakResult<RiakMap> {
        match element {
            CrdtElement::Map(entries) => Ok(RiakMap::from_entries(entries)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn empty_view() -> RiakMap {
        RiakMap::default()
    }
}

/// HyperLogLog datatype
///
/// HLLs have no client-visible causal state: contexts are never sent and
/// never reported.
#[derive(Debug, Clone, Copy)]
pub struct Hll;

impl DatatypeKind for Hll {
    type Update = HllUpdate;
    type View = RiakHll;

    const NAME: &'static str = "hll";
    const CARRIES_CONTEXT: bool = false;

    fn to_op(update: &HllUpdate) -> DtOp {
        DtOp::Hll(update.to_op())
    }

    fn view_from_element(element: CrdtElement) -> RiakResult<RiakHll> {
        match element {
            CrdtElement::Hll(cardinality) => Ok(RiakHll::new(cardinality)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn empty_view() -> RiakHll {
        RiakHll::default()
    }
}
