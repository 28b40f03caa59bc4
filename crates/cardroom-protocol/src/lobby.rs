//! Lobby records and the push events that change them.
//!
//! A lobby view lists [`GameRoomRecord`]s. After the initial snapshot the
//! list changes only through [`RosterEvent`]s, each decoded from a push
//! payload of one [`EventCategory`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ProtocolError, RoomId};

// ---------------------------------------------------------------------------
// GameRoomRecord
// ---------------------------------------------------------------------------

/// A joinable (or running) game room as the backend reports it.
///
/// `id` is the identity; every other field may change over the room's
/// life. Counter fields the backend omits default to zero. Fields this
/// client does not model are kept verbatim in `extra`, so a record
/// survives a decode/merge/encode cycle without losing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRoomRecord {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub min_players: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default)]
    pub current_players: u32,
    #[serde(default)]
    pub is_started: bool,
    #[serde(default)]
    pub current_turn: u32,
    #[serde(default)]
    pub turn_id_player: u64,
    /// Cards left in the draw pile.
    #[serde(default)]
    pub draw_top: u32,
    /// Cards in the discard pile.
    #[serde(default)]
    pub discard_top: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_max_players() -> u32 {
    1
}

impl GameRoomRecord {
    /// Creates a record with the given identity and name. Every other
    /// field takes its wire default.
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            min_players: 0,
            max_players: default_max_players(),
            current_players: 0,
            is_started: false,
            current_turn: 0,
            turn_id_player: 0,
            draw_top: 0,
            discard_top: 0,
            extra: Map::new(),
        }
    }

    /// Returns `true` while the room still has a free seat and has not
    /// started.
    pub fn is_joinable(&self) -> bool {
        !self.is_started && self.current_players < self.max_players
    }

    /// Shallow-merges `patch` into this record.
    ///
    /// Fields present in the patch overwrite, absent fields are kept.
    /// `extra` keys are upserted one by one. The identity never changes,
    /// even if the patch names another id.
    pub fn merge(&mut self, patch: &GameRoomPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(v) = patch.min_players {
            self.min_players = v;
        }
        if let Some(v) = patch.max_players {
            self.max_players = v;
        }
        if let Some(v) = patch.current_players {
            self.current_players = v;
        }
        if let Some(v) = patch.is_started {
            self.is_started = v;
        }
        if let Some(v) = patch.current_turn {
            self.current_turn = v;
        }
        if let Some(v) = patch.turn_id_player {
            self.turn_id_player = v;
        }
        if let Some(v) = patch.draw_top {
            self.draw_top = v;
        }
        if let Some(v) = patch.discard_top {
            self.discard_top = v;
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// GameRoomPatch
// ---------------------------------------------------------------------------

/// A partial record keyed by `id`, the payload of a `gameUpdate` event.
///
/// `None` means "not part of this update", not "clear this field". An
/// explicit `null` on the wire decodes to `None` as well, so
/// `{"id": 1, "name": null}` leaves the current name in place. Keys in
/// `extra` are the exception: they are upserted as sent, `null` included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRoomPatch {
    pub id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_started: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id_player: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_top: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameRoomPatch {
    /// An empty patch for `id`: merging it changes nothing.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            name: None,
            min_players: None,
            max_players: None,
            current_players: None,
            is_started: None,
            current_turn: None,
            turn_id_player: None,
            draw_top: None,
            discard_top: None,
            extra: Map::new(),
        }
    }
}

impl From<GameRoomRecord> for GameRoomPatch {
    fn from(record: GameRoomRecord) -> Self {
        Self {
            id: record.id,
            name: Some(record.name),
            min_players: Some(record.min_players),
            max_players: Some(record.max_players),
            current_players: Some(record.current_players),
            is_started: Some(record.is_started),
            current_turn: Some(record.current_turn),
            turn_id_player: Some(record.turn_id_player),
            draw_top: Some(record.draw_top),
            discard_top: Some(record.discard_top),
            extra: record.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// EventCategory
// ---------------------------------------------------------------------------

/// The push-event categories a lobby view listens to.
///
/// Removal has one canonical name, `gameRemove`; no alias is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    GameAdd,
    GameRemove,
    GameUpdate,
}

impl EventCategory {
    /// Every category, in subscription order.
    pub const ALL: [EventCategory; 3] =
        [Self::GameAdd, Self::GameRemove, Self::GameUpdate];

    /// The name used on the wire and for channel subscriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GameAdd => "gameAdd",
            Self::GameRemove => "gameRemove",
            Self::GameUpdate => "gameUpdate",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ProtocolError::InvalidMessage(format!(
                    "unknown event category {s:?}"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// RosterEvent
// ---------------------------------------------------------------------------

/// An incremental change to a lobby roster.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterEvent {
    /// A room was created.
    Added(GameRoomRecord),
    /// A room was deleted.
    Removed(RoomId),
    /// Some fields of a room changed.
    Updated(GameRoomPatch),
}

impl RosterEvent {
    /// Decodes a push payload of the given category.
    ///
    /// `gameAdd` carries a full record, `gameUpdate` a (possibly partial)
    /// record and `gameRemove` the bare room id.
    pub fn decode(
        category: EventCategory,
        payload: &Value,
    ) -> Result<Self, ProtocolError> {
        let event = match category {
            EventCategory::GameAdd => Self::Added(from_payload(payload)?),
            EventCategory::GameRemove => Self::Removed(from_payload(payload)?),
            EventCategory::GameUpdate => Self::Updated(from_payload(payload)?),
        };
        Ok(event)
    }

    /// The category this event travels under.
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Added(_) => EventCategory::GameAdd,
            Self::Removed(_) => EventCategory::GameRemove,
            Self::Updated(_) => EventCategory::GameUpdate,
        }
    }

    /// The room this event targets.
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::Added(record) => record.id,
            Self::Removed(id) => *id,
            Self::Updated(patch) => patch.id,
        }
    }
}

fn from_payload<T: serde::de::DeserializeOwned>(
    payload: &Value,
) -> Result<T, ProtocolError> {
    T::deserialize(payload).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_game(id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "max_players": 6,
            "min_players": 2,
            "current_players": 1,
            "is_started": false,
            "current_turn": 0,
            "turn_id_player": 0,
            "draw_top": 0,
            "discard_top": 0
        })
    }

    #[test]
    fn test_record_decodes_backend_game() {
        let record: GameRoomRecord =
            serde_json::from_value(backend_game(1, "Partida 1")).unwrap();
        assert_eq!(record.id, RoomId(1));
        assert_eq!(record.name, "Partida 1");
        assert_eq!(record.max_players, 6);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_record_minimal_payload_takes_defaults() {
        let record: GameRoomRecord =
            serde_json::from_value(json!({"id": 2, "name": "B"})).unwrap();
        assert_eq!(record, GameRoomRecord::new(RoomId(2), "B"));
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let record: GameRoomRecord = serde_json::from_value(
            json!({"id": 2, "name": "B", "password": "x"}),
        )
        .unwrap();
        assert_eq!(record.extra["password"], "x");
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["password"], "x");
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        let result: Result<GameRoomRecord, _> =
            serde_json::from_value(json!({"name": "no id"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_overwrites_present_fields_only() {
        let mut record = GameRoomRecord::new(RoomId(1), "A");
        record.current_players = 2;

        let patch = GameRoomPatch {
            current_players: Some(3),
            ..GameRoomPatch::new(RoomId(1))
        };
        record.merge(&patch);

        assert_eq!(record.name, "A");
        assert_eq!(record.current_players, 3);
    }

    #[test]
    fn test_null_in_update_keeps_current_value() {
        let mut record = GameRoomRecord::new(RoomId(1), "A");
        record.current_players = 2;

        let patch: GameRoomPatch = serde_json::from_value(
            json!({"id": 1, "name": null, "current_players": null, "note": null}),
        )
        .unwrap();
        assert_eq!(patch.name, None);
        record.merge(&patch);

        assert_eq!(record.name, "A");
        assert_eq!(record.current_players, 2);
        assert_eq!(record.extra["note"], Value::Null);
    }

    #[test]
    fn test_merge_upserts_extra_and_keeps_identity() {
        let mut record = GameRoomRecord::new(RoomId(1), "A");
        record.extra.insert("host".into(), json!("ana"));

        let mut patch = GameRoomPatch::new(RoomId(9));
        patch.extra.insert("locked".into(), json!(true));
        record.merge(&patch);

        assert_eq!(record.id, RoomId(1));
        assert_eq!(record.extra["host"], "ana");
        assert_eq!(record.extra["locked"], true);
    }

    #[test]
    fn test_patch_omits_absent_fields_when_encoded() {
        let patch = GameRoomPatch {
            name: Some("renamed".into()),
            ..GameRoomPatch::new(RoomId(4))
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, json!({"id": 4, "name": "renamed"}));
    }

    #[test]
    fn test_is_joinable() {
        let mut record = GameRoomRecord::new(RoomId(1), "A");
        record.max_players = 2;
        record.current_players = 1;
        assert!(record.is_joinable());
        record.current_players = 2;
        assert!(!record.is_joinable());
        record.current_players = 0;
        record.is_started = true;
        assert!(!record.is_joinable());
    }

    #[test]
    fn test_event_category_names() {
        assert_eq!(EventCategory::GameAdd.as_str(), "gameAdd");
        assert_eq!(EventCategory::GameRemove.as_str(), "gameRemove");
        assert_eq!(EventCategory::GameUpdate.as_str(), "gameUpdate");
        assert_eq!(
            "gameUpdate".parse::<EventCategory>().unwrap(),
            EventCategory::GameUpdate
        );
    }

    #[test]
    fn test_game_delete_is_not_a_category() {
        assert!(matches!(
            "gameDelete".parse::<EventCategory>(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_decode_added() {
        let event =
            RosterEvent::decode(EventCategory::GameAdd, &backend_game(2, "Partida 2"))
                .unwrap();
        assert_eq!(event.category(), EventCategory::GameAdd);
        assert_eq!(event.room_id(), RoomId(2));
    }

    #[test]
    fn test_decode_removed_takes_bare_id() {
        let event =
            RosterEvent::decode(EventCategory::GameRemove, &json!(1)).unwrap();
        assert_eq!(event, RosterEvent::Removed(RoomId(1)));
    }

    #[test]
    fn test_decode_updated_partial() {
        let event = RosterEvent::decode(
            EventCategory::GameUpdate,
            &json!({"id": 2, "name": "Partida 2 - Actualizada"}),
        )
        .unwrap();
        let RosterEvent::Updated(patch) = event else {
            panic!("expected update");
        };
        assert_eq!(patch.name.as_deref(), Some("Partida 2 - Actualizada"));
        assert_eq!(patch.current_players, None);
    }

    #[test]
    fn test_decode_wrong_shape_is_decode_error() {
        let result =
            RosterEvent::decode(EventCategory::GameRemove, &json!({"oops": 1}));
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
