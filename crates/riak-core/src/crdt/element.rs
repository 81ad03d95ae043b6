//! Map field identity and the server's CRDT element

use crate::binary::BinaryValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kinds of value a map field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Counter field
    Counter,
    /// Last-write-wins register field
    Register,
    /// Enable/disable flag field
    Flag,
    /// Set field
    Set,
    /// Nested map field
    Map,
}

impl FieldType {
    /// Lower-case name used in messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Register => "register",
            Self::Flag => "flag",
            Self::Set => "set",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a map field.
///
/// The pair (name, type) is the identity: a counter and a map may share a
/// name inside the same parent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    /// Field name
    pub name: BinaryValue,
    /// Field type
    pub field_type: FieldType,
}

impl FieldRef {
    /// Create a field reference
    pub fn new(name: impl Into<BinaryValue>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.field_type)
    }
}

/// A datatype value as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrdtElement {
    /// Counter value
    Counter(i64),
    /// Observed-remove set members
    Set(BTreeSet<BinaryValue>),
    /// Grow-only set members
    GSet(BTreeSet<BinaryValue>),
    /// Map entries keyed by field identity
    Map(BTreeMap<FieldRef, CrdtElement>),
    /// Register value (only found inside maps)
    Register(BinaryValue),
    /// Flag value (only found inside maps)
    Flag(bool),
    /// HyperLogLog cardinality estimate
    Hll(u64),
}

impl CrdtElement {
    /// Name of the carried datatype
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Set(_) => "set",
            Self::GSet(_) => "gset",
            Self::Map(_) => "map",
            Self::Register(_) => "register",
            Self::Flag(_) => "flag",
            Self::Hll(_) => "hll",
        }
    }

    /// The field type an element of this kind occupies inside a map
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Counter(_) => Some(FieldType::Counter),
            Self::Set(_) => Some(FieldType::Set),
            Self::Map(_) => Some(FieldType::Map),
            Self::Register(_) => Some(FieldType::Register),
            Self::Flag(_) => Some(FieldType::Flag),
            Self::GSet(_) | Self::Hll(_) => None,
        }
    }
}
