use super::DatatypeUpdate;
use riak_core::crdt::RegisterOp;
use riak_core::BinaryValue;

/// Register replacement; only valid as a map field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterUpdate {
    value: BinaryValue,
}

impl RegisterUpdate {
    /// Replace the register with `value`
    pub fn new(value: impl Into<BinaryValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The replacement value
    pub fn value(&self) -> &BinaryValue {
        &self.value
    }
}

impl DatatypeUpdate for RegisterUpdate {
    type Op = RegisterOp;

    fn to_op(&self) -> RegisterOp {
        RegisterOp(self.value.clone())
    }
}
