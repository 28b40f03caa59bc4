//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes or JSON were reachable but did
//! not have the expected shape. Network failures live in the transport
//! crate.

/// Errors that can occur while encoding or decoding wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes or a JSON value into a type).
    ///
    /// Common causes: malformed JSON, missing required fields such as a
    /// room's `id`, or a number where a string was expected.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The data parsed but violates a protocol rule, e.g. a push frame
    /// whose `type` names no known event category.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
