//! Identifier newtypes and the push-channel frame.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a game room (a "game" on the backend).
///
/// Serialized as the plain number the backend uses, so `RoomId(3)`
/// is `3` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// Identifier of a card in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PushFrame
// ---------------------------------------------------------------------------

/// One message on the push channel.
///
/// ```text
/// { "type": "gameUpdate", "payload": { "id": 2, "name": "..." } }
/// ```
///
/// `kind` is the event category name. The payload stays untyped here;
/// listeners decode it for their category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl PushFrame {
    /// Returns the room a payload is scoped to, if it carries a `room` key.
    ///
    /// The backend tags some payloads with the push room they belong to;
    /// listeners connected to another room must not see them. Numbers and
    /// strings both appear on the wire, so the tag is normalised to a string:
    /// `{"room": 5}` and `{"room": "5"}` name the same room. An empty string
    /// or `0` counts as no tag.
    pub fn room_tag(&self) -> Option<String> {
        Self::payload_room_tag(&self.payload)
    }

    /// Same as [`room_tag`](Self::room_tag) for a bare payload value.
    pub fn payload_room_tag(payload: &Value) -> Option<String> {
        match payload.get("room")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_u64() != Some(0) => Some(n.to_string()),
            _ => None,
        }
    }
}
