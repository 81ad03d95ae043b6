//! Immutable byte strings
//!
//! Riak keys, bucket names, set members and index terms are all arbitrary
//! bytes. `BinaryValue` keeps them opaque and offers UTF-8 views on demand.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Immutable byte string
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BinaryValue(Vec<u8>);

impl BinaryValue {
    /// Wrap raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Copy bytes out of a slice
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// UTF-8 view, if the bytes are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// UTF-8 view with invalid sequences replaced
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => f.write_str(text),
            None => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}

impl From<&str> for BinaryValue {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for BinaryValue {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&String> for BinaryValue {
    fn from(value: &String) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for BinaryValue {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for BinaryValue {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for BinaryValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_values_display_as_text() {
        let value = BinaryValue::from("apple");
        assert_eq!(value.as_str(), Some("apple"));
        assert_eq!(value.to_string(), "apple");
    }

    #[test]
    fn binary_values_display_as_hex() {
        let value = BinaryValue::new(vec![0xff, 0x00, 0x10]);
        assert_eq!(value.as_str(), None);
        assert_eq!(value.to_string(), "0xff0010");
        assert_eq!(value.to_string_lossy(), "\u{fffd}\u{0}\u{10}");
    }

    #[test]
    fn ordering_is_bytewise() {
        assert!(BinaryValue::from("a") < BinaryValue::from("b"));
        assert!(BinaryValue::from("10") < BinaryValue::from("9"));
    }
}
