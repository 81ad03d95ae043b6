//! Unified error system for the Riak client
//!
//! A single error type shared by every crate in the workspace. Construction
//! errors are raised synchronously by builders, decode errors by response
//! adapters, and the streaming variants by the chunk handoff.

use serde::{Deserialize, Serialize};

/// Unified error type for all Riak client operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RiakError {
    /// Invalid argument supplied to a builder or constructor
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected input
        message: String,
    },

    /// The server returned a datatype other than the one the command expects
    #[error("Datatype mismatch: expected {expected}, got {actual}")]
    DatatypeMismatch {
        /// Datatype the command was declared for
        expected: String,
        /// Datatype carried by the response
        actual: String,
    },

    /// A response could not be interpreted
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Description of the problem
        message: String,
    },

    /// Encoding or decoding of a wire payload failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Codec error message
        message: String,
    },

    /// Opaque failure reported by the transport layer
    #[error("Transport error: {message}")]
    Transport {
        /// Message as reported by the transport
        message: String,
    },

    /// No chunk arrived within the bounded wait
    #[error("Timed out after {timeout_ms}ms waiting for the next chunk")]
    StreamTimeout {
        /// The wait bound in milliseconds
        timeout_ms: u64,
    },

    /// A blocking wait was interrupted
    #[error("Interrupted while waiting for the next chunk")]
    Interrupted,

    /// The producer went away without signalling completion
    #[error("Stream aborted: {reason}")]
    StreamAborted {
        /// Why the stream ended early
        reason: String,
    },

    /// The consumer abandoned the stream
    #[error("Stream cancelled by consumer")]
    Cancelled,

    /// The operation is not available on this value
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// The rejected operation
        operation: String,
    },

    /// `next` was called on an exhausted iterator
    #[error("No such element")]
    NoSuchElement,
}

impl RiakError {
    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a datatype mismatch error
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DatatypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a stream timeout error
    pub fn stream_timeout(timeout: std::time::Duration) -> Self {
        Self::StreamTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a stream aborted error
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::StreamAborted {
            reason: reason.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Whether this is a chunk-wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StreamTimeout { .. })
    }

    /// Whether this error was raised at build time, before any I/O
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Whether waiting again may succeed.
    ///
    /// Only chunk-wait timeouts qualify; retry of transport failures belongs
    /// to the transport.
    pub fn is_retryable(&self) -> bool {
        self.is_timeout()
    }
}

/// Standard Result type for Riak client operations
pub type RiakResult<T> = std::result::Result<T, RiakError>;

impl From<bincode::Error> for RiakError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
