//! Namespaces and locations
//!
//! A namespace is a (bucket type, bucket) pair; a location adds a key.

use crate::binary::BinaryValue;
use crate::errors::{RiakError, RiakResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the bucket type used when none is given
pub const DEFAULT_BUCKET_TYPE: &str = "default";

/// A bucket within a bucket type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace {
    bucket_type: BinaryValue,
    bucket: BinaryValue,
}

impl Namespace {
    /// Create a namespace, rejecting empty components
    pub fn new(
        bucket_type: impl Into<BinaryValue>,
        bucket: impl Into<BinaryValue>,
    ) -> RiakResult<Self> {
        let bucket_type = bucket_type.into();
        let bucket = bucket.into();
        if bucket_type.is_empty() {
            return Err(RiakError::invalid("bucket type cannot be empty"));
        }
        if bucket.is_empty() {
            return Err(RiakError::invalid("bucket name cannot be empty"));
        }
        Ok(Self {
            bucket_type,
            bucket,
        })
    }

    /// Create a namespace in the `default` bucket type
    pub fn with_default_type(bucket: impl Into<BinaryValue>) -> RiakResult<Self> {
        Self::new(DEFAULT_BUCKET_TYPE, bucket)
    }

    /// Bucket type
    pub fn bucket_type(&self) -> &BinaryValue {
        &self.bucket_type
    }

    /// Bucket name
    pub fn bucket(&self) -> &BinaryValue {
        &self.bucket
    }

    /// Whether this namespace uses the `default` bucket type
    pub fn is_default_type(&self) -> bool {
        self.bucket_type.as_bytes() == DEFAULT_BUCKET_TYPE.as_bytes()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket_type, self.bucket)
    }
}

/// A key within a namespace
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    namespace: Namespace,
    key: BinaryValue,
}

impl Location {
    /// Create a location, rejecting empty keys
    pub fn new(namespace: Namespace, key: impl Into<BinaryValue>) -> RiakResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(RiakError::invalid("key cannot be empty"));
        }
        Ok(Self { namespace, key })
    }

    /// Namespace of this location
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Key within the namespace
    pub fn key(&self) -> &BinaryValue {
        &self.key
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}
