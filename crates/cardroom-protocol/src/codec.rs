//! Codec trait and the JSON implementation.
//!
//! The push channel receives raw frames and the REST collaborators receive
//! raw bodies; both hand bytes to a [`Codec`] to get typed values out.
//! Swapping the wire format means swapping the codec, nothing else.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync`: the push channel's connection task decodes frames on
///   whatever Tokio worker thread it happens to run on.
/// - `'static`: the codec lives inside that task for as long as the
///   connection does, so it owns everything it needs.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type, so one codec
/// handles push frames, room records and card placements alike.
/// `decode` asks for `DeserializeOwned` rather than `Deserialize<'de>`:
/// the decoded value owns its strings and can outlive the frame buffer it
/// came from.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`), the format the game
/// backend speaks on both REST and push channels.
///
/// ```rust
/// use cardroom_protocol::{Codec, JsonCodec, PushFrame};
///
/// let frame: PushFrame = JsonCodec
///     .decode(br#"{"type": "gameRemove", "payload": 7}"#)
///     .unwrap();
/// assert_eq!(frame.kind, "gameRemove");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
