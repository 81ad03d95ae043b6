use super::DatatypeUpdate;
use riak_core::crdt::HllOp;
use riak_core::BinaryValue;
use std::collections::BTreeSet;

/// HyperLogLog update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HllUpdate {
    adds: BTreeSet<BinaryValue>,
}

impl HllUpdate {
    /// An empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to the estimator
    pub fn add(mut self, value: impl Into<BinaryValue>) -> Self {
        self.adds.insert(value.into());
        self
    }

    /// Add several elements
    pub fn add_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<BinaryValue>,
    {
        self.adds.extend(values.into_iter().map(Into::into));
        self
    }

    /// Elements to add
    pub fn adds(&self) -> &BTreeSet<BinaryValue> {
        &self.adds
    }
}

impl DatatypeUpdate for HllUpdate {
    type Op = HllOp;

    fn to_op(&self) -> HllOp {
        HllOp {
            adds: self.adds.clone(),
        }
    }
}
