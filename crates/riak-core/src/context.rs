//! Causal context
//!
//! Opaque version information handed out by a fetch and handed back on the
//! next update so the server can merge concurrent writes.

use crate::binary::BinaryValue;
use serde::{Deserialize, Serialize};

/// Opaque causal context
///
/// Never inspected by the client; it must reach the server unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CausalContext(BinaryValue);

impl CausalContext {
    /// Wrap context bytes received from the server
    pub fn new(bytes: impl Into<BinaryValue>) -> Self {
        Self(bytes.into())
    }

    /// The opaque bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The opaque value
    pub fn value(&self) -> &BinaryValue {
        &self.0
    }
}

impl From<BinaryValue> for CausalContext {
    fn from(value: BinaryValue) -> Self {
        Self(value)
    }
}
