//! Operation tree
//!
//! Immutable nodes carrying exactly what the server needs to merge an update.
//! Collections are ordered sets, so byte-identical duplicates collapse while
//! distinct operations on the same field are all kept.

use super::element::{FieldRef, FieldType};
use crate::binary::BinaryValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counter increment (negative values decrement)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CounterOp {
    /// Signed delta
    pub delta: i64,
}

/// Set mutation.
///
/// An element present in both `adds` and `removes` is sent as-is; the server
/// decides the outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetOp {
    /// Elements to add
    pub adds: BTreeSet<BinaryValue>,
    /// Elements to remove
    pub removes: BTreeSet<BinaryValue>,
}

impl SetOp {
    /// Whether the operation changes nothing
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

/// Grow-only set mutation; there is no removal half
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GSetOp {
    /// Elements to add
    pub adds: BTreeSet<BinaryValue>,
}

/// HyperLogLog mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HllOp {
    /// Elements to add to the estimator
    pub adds: BTreeSet<BinaryValue>,
}

/// Register replacement
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegisterOp(pub BinaryValue);

/// Flag toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlagOp {
    /// Set the flag
    Enable,
    /// Clear the flag
    Disable,
}

impl From<bool> for FlagOp {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enable
        } else {
            Self::Disable
        }
    }
}

/// Operation on a single map field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldOp {
    /// Counter field operation
    Counter(CounterOp),
    /// Set field operation
    Set(SetOp),
    /// Register field operation
    Register(RegisterOp),
    /// Flag field operation
    Flag(FlagOp),
    /// Nested map operation
    Map(MapOp),
}

impl FieldOp {
    /// Field type this operation applies to
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

/// An update entry of a map operation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapFieldOp {
    /// Target field
    pub field: FieldRef,
    /// Operation on that field
    pub op: FieldOp,
}

/// Map mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapOp {
    /// Fields to remove
    pub removes: BTreeSet<FieldRef>,
    /// Field updates
    pub updates: BTreeSet<MapFieldOp>,
}

impl MapOp {
    /// Add a removal
    pub fn remove(mut self, field: FieldRef) -> Self {
        self.removes.insert(field);
        self
    }

    /// Add a field update.
    ///
    /// Set semantics: a second, different operation for the same field is
    /// kept alongside the first.
    pub fn update(mut self, field: FieldRef, op: FieldOp) -> Self {
        self.updates.insert(MapFieldOp { field, op });
        self
    }

    /// Whether the operation changes nothing
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty() && self.updates.is_empty()
    }

    /// Updates targeting the given field
    pub fn updates_for<'a>(
        &'a self,
        field: &'a FieldRef,
    ) -> impl Iterator<Item = &'a FieldOp> + 'a {
        self.updates
            .iter()
            .filter(move |entry| &entry.field == field)
            .map(|entry| &entry.op)
    }
}

/// Top-level datatype operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DtOp {
    /// Counter update
    Counter(CounterOp),
    /// Set update
    Set(SetOp),
    /// Grow-only set update
    GSet(GSetOp),
    /// Map update
    Map(MapOp),
    /// HyperLogLog update
    Hll(HllOp),
}

impl DtOp {
    /// Name of the targeted datatype
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Set(_) => "set",
            Self::GSet(_) => "gset",
            Self::Map(_) => "map",
            Self::Hll(_) => "hll",
        }
    }
}
