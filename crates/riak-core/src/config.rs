//! Client configuration
//!
//! Defaults, TOML files and `RIAK_*` environment variables, applied in that
//! order. Environment values override file values.

use crate::binary::BinaryValue;
use crate::errors::{RiakError, RiakResult};
use crate::location::{Namespace, DEFAULT_BUCKET_TYPE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_CHUNK_TIMEOUT_MS: &str = "RIAK_STREAM_CHUNK_TIMEOUT_MS";
const ENV_QUEUE_CAPACITY: &str = "RIAK_STREAM_QUEUE_CAPACITY";
const ENV_DEFAULT_BUCKET_TYPE: &str = "RIAK_DEFAULT_BUCKET_TYPE";

/// Streaming query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Bound on each wait for the next chunk
    pub chunk_timeout_ms: u64,
    /// Maximum number of chunks queued between producer and consumer
    pub chunk_queue_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_timeout_ms: 5_000,
            chunk_queue_capacity: 16,
        }
    }
}

impl StreamingConfig {
    /// Chunk wait bound as a duration
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }
}

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Streaming query parameters
    pub streaming: StreamingConfig,
    /// Bucket type used by convenience constructors
    pub default_bucket_type: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            streaming: StreamingConfig::default(),
            default_bucket_type: DEFAULT_BUCKET_TYPE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> RiakResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RiakError::invalid(format!("Invalid TOML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> RiakResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RiakError::invalid(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Merge with environment variables
    pub fn merge_with_env(&mut self) -> RiakResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge with an explicit set of variables
    pub fn merge_with_vars<I>(&mut self, vars: I) -> RiakResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_CHUNK_TIMEOUT_MS => {
                    self.streaming.chunk_timeout_ms = parse_var(&key, &value)?;
                }
                ENV_QUEUE_CAPACITY => {
                    self.streaming.chunk_queue_capacity = parse_var(&key, &value)?;
                }
                ENV_DEFAULT_BUCKET_TYPE => {
                    self.default_bucket_type = value;
                }
                _ => {}
            }
        }
        self.validate()
    }

    /// Namespace for `bucket` in the configured default bucket type
    pub fn namespace(&self, bucket: impl Into<BinaryValue>) -> RiakResult<Namespace> {
        Namespace::new(self.default_bucket_type.as_str(), bucket)
    }

    /// Validate the configuration
    pub fn validate(&self) -> RiakResult<()> {
        if self.streaming.chunk_timeout_ms == 0 {
            return Err(RiakError::invalid("streaming.chunk_timeout_ms must be positive"));
        }
        if self.streaming.chunk_queue_capacity == 0 {
            return Err(RiakError::invalid(
                "streaming.chunk_queue_capacity must be positive",
            ));
        }
        if self.default_bucket_type.is_empty() {
            return Err(RiakError::invalid("default_bucket_type cannot be empty"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> RiakResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RiakError::invalid(format!("{key} has invalid value '{value}'")))
}
