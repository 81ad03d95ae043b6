//! Typed views of server datatype values

use riak_core::{BinaryValue, CrdtElement, FieldRef, FieldType};
use std::collections::{BTreeMap, BTreeSet};

/// Counter value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiakCounter(i64);

impl RiakCounter {
    /// Wrap a counter value
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current value
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Observed-remove set value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiakSet(BTreeSet<BinaryValue>);

impl RiakSet {
    /// Wrap set members
    pub fn new(members: BTreeSet<BinaryValue>) -> Self {
        Self(members)
    }

    /// Whether `value` is a member
    pub fn contains(&self, value: impl Into<BinaryValue>) -> bool {
        self.0.contains(&value.into())
    }

    /// Members in byte order
    pub fn members(&self) -> &BTreeSet<BinaryValue> {
        &self.0
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Grow-only set value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiakGSet(BTreeSet<BinaryValue>);

impl RiakGSet {
    /// Wrap set members
    pub fn new(members: BTreeSet<BinaryValue>) -> Self {
        Self(members)
    }

    /// Whether `value` is a member
    pub fn contains(&self, value: impl Into<BinaryValue>) -> bool {
        self.0.contains(&value.into())
    }

    /// Members in byte order
    pub fn members(&self) -> &BTreeSet<BinaryValue> {
        &self.0
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// HyperLogLog cardinality estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiakHll(u64);

impl RiakHll {
    /// Wrap an estimate
    pub fn new(cardinality: u64) -> Self {
        Self(cardinality)
    }

    /// Estimated number of distinct elements
    pub fn cardinality(&self) -> u64 {
        self.0
    }
}

/// Register value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiakRegister(BinaryValue);

impl RiakRegister {
    /// Wrap a register value
    pub fn new(value: BinaryValue) -> Self {
        Self(value)
    }

    /// Current value
    pub fn value(&self) -> &BinaryValue {
        &self.0
    }
}

/// Flag value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiakFlag(bool);

impl RiakFlag {
    /// Wrap a flag value
    pub fn new(enabled: bool) -> Self {
        Self(enabled)
    }

    /// Whether the flag is set
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Map value keyed by field identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiakMap(BTreeMap<FieldRef, RiakDatatype>);

impl RiakMap {
    /// Wrap map entries
    pub fn new(entries: BTreeMap<FieldRef, RiakDatatype>) -> Self {
        Self(entries)
    }

    /// Value of a field
    pub fn get(&self, field: &FieldRef) -> Option<&RiakDatatype> {
        self.0.get(field)
    }

    fn lookup(&self, name: impl Into<BinaryValue>, field_type: FieldType) -> Option<&RiakDatatype> {
        self.0.get(&FieldRef::new(name, field_type))
    }

    /// Counter field
    pub fn counter(&self, name: impl Into<BinaryValue>) -> Option<&RiakCounter> {
        match self.lookup(name, FieldType::Counter) {
            Some(RiakDatatype::Counter(counter)) => Some(counter),
            _ => None,
        }
    }

    /// Set field
    pub fn set(&self, name: impl Into<BinaryValue>) -> Option<&RiakSet> {
        match self.lookup(name, FieldType::Set) {
            Some(RiakDatatype::Set(set)) => Some(set),
            _ => None,
        }
    }

    /// Register field
    pub fn register(&self, name: impl Into<BinaryValue>) -> Option<&RiakRegister> {
        match self.lookup(name, FieldType::Register) {
            Some(RiakDatatype::Register(register)) => Some(register),
            _ => None,
        }
    }

    /// Flag field
    pub fn flag(&self, name: impl Into<BinaryValue>) -> Option<&RiakFlag> {
        match self.lookup(name, FieldType::Flag) {
            Some(RiakDatatype::Flag(flag)) => Some(flag),
            _ => None,
        }
    }

    /// Nested map field
    pub fn map(&self, name: impl Into<BinaryValue>) -> Option<&RiakMap> {
        match self.lookup(name, FieldType::Map) {
            Some(RiakDatatype::Map(map)) => Some(map),
            _ => None,
        }
    }

    /// All fields in (name, type) order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldRef, &RiakDatatype)> {
        self.0.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Any datatype value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiakDatatype {
    /// Counter
    Counter(RiakCounter),
    /// Set
    Set(RiakSet),
    /// Grow-only set
    GSet(RiakGSet),
    /// Map
    Map(RiakMap),
    /// Register
    Register(RiakRegister),
    /// Flag
    Flag(RiakFlag),
    /// HyperLogLog
    Hll(RiakHll),
}

impl RiakDatatype {
    /// Convert a server element, recursing into maps
    pub fn from_element(element: CrdtElement) -> Self {
        match element {
            CrdtElement::Counter(value) => Self::Counter(RiakCounter(value)),
            CrdtElement::Set(members) => Self::Set(RiakSet(members)),
            CrdtElement::GSet(members) => Self::GSet(RiakGSet(members)),
            CrdtElement::Map(entries) => Self::Map(RiakMap::from_entries(entries)),
            CrdtElement::Register(value) => Self::Register(RiakRegister(value)),
            CrdtElement::Flag(enabled) => Self::Flag(RiakFlag(enabled)),
            CrdtElement::Hll(cardinality) => Self::Hll(RiakHll(cardinality)),
        }
    }
}

impl RiakMap {
    pub(crate) fn from_entries(entries: BTreeMap<FieldRef, CrdtElement>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(field, element)| (field, RiakDatatype::from_element(element)))
                .collect(),
        )
    }
}
