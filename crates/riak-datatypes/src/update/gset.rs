use super::DatatypeUpdate;
use riak_core::crdt::GSetOp;
use riak_core::BinaryValue;
use std::collections::BTreeSet;

/// Grow-only set update
///
/// There is no remove: a grow-only set never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GSetUpdate {
    adds: BTreeSet<BinaryValue>,
}

impl GSetUpdate {
    /// An empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    pub fn add(mut self, value: impl Into<BinaryValue>) -> Self {
        self.adds.insert(value.into());
        self
    }

    /// Elements to add
    pub fn adds(&self) -> &BTreeSet<BinaryValue> {
        &self.adds
    }
}

impl DatatypeUpdate for GSetUpdate {
    type Op = GSetOp;

    fn to_op(&self) -> GSetOp {
        GSetOp {
            adds: self.adds.clone(),
        }
    }
}
