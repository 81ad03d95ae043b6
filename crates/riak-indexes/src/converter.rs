//! Index key converters
//!
//! Convert between typed index keys and the bytes sent on the wire. Integer
//! keys travel as decimal ASCII (`-42` is the three bytes `b"-42"`), which
//! is what the server parses and compares numerically.

use num_bigint::BigInt;
use riak_core::{BinaryValue, RiakError, RiakResult};
use std::fmt::Debug;

/// Typed view of index keys
pub trait IndexConverter: Send + Sync + 'static {
    /// Key type seen by callers
    type Value: Clone + Debug + Send;

    /// Index name suffix, empty when the caller supplies the full name
    const SUFFIX: &'static str;

    /// Whether regex term filters are allowed
    const SUPPORTS_TERM_FILTER: bool;

    /// Encode a key for the wire
    fn to_bytes(value: &Self::Value) -> BinaryValue;

    /// Decode a key received from the server
    fn from_bytes(bytes: &BinaryValue) -> RiakResult<Self::Value>;

    /// Full index name for `name`, appending the suffix unless already present
    fn index_name(name: &str) -> BinaryValue {
        if name.ends_with(Self::SUFFIX) || name.starts_with('$') {
            BinaryValue::from(name)
        } else {
            BinaryValue::from(format!("{name}{}", Self::SUFFIX))
        }
    }
}

/// Raw byte keys under a caller-supplied index name
#[derive(Debug, Clone, Copy)]
pub struct RawConverter;

impl IndexConverter for RawConverter {
    type Value = BinaryValue;

    const SUFFIX: &'static str = "";
    const SUPPORTS_TERM_FILTER: bool = true;

    fn to_bytes(value: &BinaryValue) -> BinaryValue {
        value.clone()
    }

    fn from_bytes(bytes: &BinaryValue) -> RiakResult<BinaryValue> {
        Ok(bytes.clone())
    }
}

/// UTF-8 string keys in a `_bin` index
#[derive(Debug, Clone, Copy)]
pub struct StringConverter;

impl IndexConverter for StringConverter {
    type Value = String;

    const SUFFIX: &'static str = "_bin";
    const SUPPORTS_TERM_FILTER: bool = true;

    fn to_bytes(value: &String) -> BinaryValue {
        BinaryValue::from(value.as_str())
    }

    fn from_bytes(bytes: &BinaryValue) -> RiakResult<String> {
        bytes
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| RiakError::malformed(format!("index key {bytes} is not valid UTF-8")))
    }
}

/// 64-bit integer keys in an `_int` index
#[derive(Debug, Clone, Copy)]
pub struct IntConverter;

impl IndexConverter for IntConverter {
    type Value = i64;

    const SUFFIX: &'static str = "_int";
    const SUPPORTS_TERM_FILTER: bool = false;

    fn to_bytes(value: &i64) -> BinaryValue {
        BinaryValue::from(value.to_string())
    }

    fn from_bytes(bytes: &BinaryValue) -> RiakResult<i64> {
        decimal(bytes)?
            .parse()
            .map_err(|e| RiakError::malformed(format!("index key {bytes} is not an i64: {e}")))
    }
}

/// Arbitrary-precision integer keys in an `_int` index
#[derive(Debug, Clone, Copy)]
pub struct BigIntConverter;

impl IndexConverter for BigIntConverter {
    type Value = BigInt;

    const SUFFIX: &'static str = "_int";
    const SUPPORTS_TERM_FILTER: bool = false;

    fn to_bytes(value: &BigInt) -> BinaryValue {
        BinaryValue::from(value.to_string())
    }

    fn from_bytes(bytes: &BinaryValue) -> RiakResult<BigInt> {
        decimal(bytes)?
            .parse()
            .map_err(|e| RiakError::malformed(format!("index key {bytes} is not an integer: {e}")))
    }
}

fn decimal(bytes: &BinaryValue) -> RiakResult<&str> {
    bytes
        .as_str()
        .ok_or_else(|| RiakError::malformed(format!("index key {bytes} is not ASCII")))
}
