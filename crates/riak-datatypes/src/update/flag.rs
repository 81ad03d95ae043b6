use super::DatatypeUpdate;
use riak_core::crdt::FlagOp;

/// Flag toggle; only valid as a map field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagUpdate {
    enabled: bool,
}

impl FlagUpdate {
    /// Set the flag to `enabled`
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Change the target state
    pub fn set(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Target state
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl DatatypeUpdate for FlagUpdate {
    type Op = FlagOp;

    fn to_op(&self) -> FlagOp {
        FlagOp::from(self.enabled)
    }
}
