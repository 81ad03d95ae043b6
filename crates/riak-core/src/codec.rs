//! Wire format helpers.
//!
//! Operations and responses are framed with a schema version so that both
//! sides can reject payloads they do not understand.

use crate::errors::{RiakError, RiakResult};
use crate::operations::{CoreOperation, CoreResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Version stamped on every payload
pub const WIRE_SCHEMA_VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema_version: u16,
    payload: T,
}

fn encode<T: Serialize>(payload: &T) -> RiakResult<Vec<u8>> {
    let envelope = Envelope {
        schema_version: WIRE_SCHEMA_VERSION,
        payload,
    };
    Ok(bincode::serialize(&envelope)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> RiakResult<T> {
    let envelope: Envelope<T> = bincode::deserialize(bytes)?;
    if envelope.schema_version != WIRE_SCHEMA_VERSION {
        return Err(RiakError::serialization(format!(
            "unsupported schema version {}",
            envelope.schema_version
        )));
    }
    Ok(envelope.payload)
}

/// Encode an operation for the wire
pub fn encode_operation(op: &CoreOperation) -> RiakResult<Vec<u8>> {
    encode(op)
}

/// Decode an operation received from the wire
pub fn decode_operation(bytes: &[u8]) -> RiakResult<CoreOperation> {
    decode(bytes)
}

/// Encode a response for the wire
pub fn encode_response(response: &CoreResponse) -> RiakResult<Vec<u8>> {
    encode(response)
}

/// Decode a response received from the wire
pub fn decode_response(bytes: &[u8]) -> RiakResult<CoreResponse> {
    decode(bytes)
}
