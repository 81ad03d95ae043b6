//! Datatype update descriptors
//!
//! Each descriptor is a plain value describing a client-side mutation. They
//! compile to the operation tree in `riak_core::crdt` and compilation never
//! fails. Descriptors are immutable once handed to a command, so the same
//! descriptor can be compiled for any number of submissions.

mod counter;
mod flag;
mod gset;
mod hll;
mod map;
mod register;
mod set;

pub use counter::CounterUpdate;
pub use flag::FlagUpdate;
pub use gset::GSetUpdate;
pub use hll::HllUpdate;
pub use map::MapUpdate;
pub use register::RegisterUpdate;
pub use set::SetUpdate;

use riak_core::crdt::{FieldOp, FieldType};

/// A mutation that compiles to an operation node
pub trait DatatypeUpdate {
    /// Operation node produced by this update
    type Op;

    /// Compile into an operation node
    fn to_op(&self) -> Self::Op;
}

/// Update for one map field.
///
/// Covers the five kinds a map can hold; nested maps are the `Map` case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Counter field
    Counter(CounterUpdate),
    /// Set field
    Set(SetUpdate),
    /// Register field
    Register(RegisterUpdate),
    /// Flag field
    Flag(FlagUpdate),
    /// Nested map field
    Map(MapUpdate),
}

impl FieldUpdate {
    /// Field type this update targets
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Counter(_) => FieldType::Counter,
            Self::Set(_) => FieldType::Set,
            Self::Register(_) => FieldType::Register,
            Self::Flag(_) => FieldType::Flag,
            Self::Map(_) => FieldType::Map,
        }
    }
}

impl DatatypeUpdate for FieldUpdate {
    type Op = FieldOp;

    fn to_op(&self) -> FieldOp {
        match self {
            Self::Counter(update) => FieldOp::Counter(update.to_op()),
            Self::Set(update) => FieldOp::Set(update.to_op()),
            Self::Register(update) => FieldOp::Register(update.to_op()),
            Self::Flag(update) => FieldOp::Flag(update.to_op()),
            Self::Map(update) => FieldOp::Map(update.to_op()),
        }
    }
}

impl From<CounterUpdate> for FieldUpdate {
    fn from(update: CounterUpdate) -> Self {
        Self::Counter(update)
    }
}

impl From<SetUpdate> for FieldUpdate {
    fn from(update: SetUpdate) -> Self {
        Self::Set(update)
    }
}

impl From<RegisterUpdate> for FieldUpdate {
    fn from(update: RegisterUpdate) -> Self {
        Self::Register(update)
    }
}

impl From<FlagUpdate> for FieldUpdate {
    fn from(update: FlagUpdate) -> Self {
        Self::Flag(update)
    }
}

impl From<MapUpdate> for FieldUpdate {
    fn from(update: MapUpdate) -> Self {
        Self::Map(update)
    }
}
