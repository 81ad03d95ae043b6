use super::DatatypeUpdate;
use riak_core::crdt::SetOp;
use riak_core::BinaryValue;
use std::collections::BTreeSet;

/// Observed-remove set update
///
/// Adds and removes are collected independently. An element in both halves
/// is sent as-is and the server's policy decides the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetUpdate {
    adds: BTreeSet<BinaryValue>,
    removes: BTreeSet<BinaryValue>,
}

impl SetUpdate {
    /// An empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    pub fn add(mut self, value: impl Into<BinaryValue>) -> Self {
        self.adds.insert(value.into());
        self
    }

    /// Remove an element
    pub fn remove(mut self, value: impl Into<BinaryValue>) -> Self {
        self.removes.insert(value.into());
        self
    }

    /// Elements to add
    pub fn adds(&self) -> &BTreeSet<BinaryValue> {
        &self.adds
    }

    /// Elements to remove
    pub fn removes(&self) -> &BTreeSet<BinaryValue> {
        &self.removes
    }
}

impl DatatypeUpdate for SetUpdate {
    type Op = SetOp;

    fn to_op(&self) -> SetOp {
        SetOp {
            adds: self.adds.clone(),
            removes: self.removes.clone(),
        }
    }
}
