use super::DatatypeUpdate;
use riak_core::crdt::CounterOp;

/// Counter increment or decrement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterUpdate {
    delta: i64,
}

impl CounterUpdate {
    /// Update by `delta`; negative values decrement
    pub fn new(delta: i64) -> Self {
        Self { delta }
    }

    /// The delta
    pub fn delta(&self) -> i64 {
        self.delta
    }
}

impl DatatypeUpdate for CounterUpdate {
    type Op = CounterOp;

    fn to_op(&self) -> CounterOp {
        CounterOp { delta: self.delta }
    }
}
