//! Wire types for the cardroom client.
//!
//! This crate defines the data the client exchanges with the game backend:
//!
//! - **Lobby** ([`GameRoomRecord`], [`GameRoomPatch`], [`RosterEvent`]):
//!   the records a lobby view shows and the push events that change them.
//! - **Cards** ([`CardPlacement`], [`CatalogCard`], [`DraftCardView`],
//!   [`DeckSummary`]): what the in-game deck panel is built from.
//! - **Frames** ([`PushFrame`]): the `{"type", "payload"}` envelope of the
//!   push channel.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes to types and back.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes, HTTP) → Protocol (typed records/events) → Roster / Deck
//! ```
//!
//! Nothing here performs I/O or owns state; the roster and deck crates
//! decide what to do with these values.

mod cards;
mod codec;
mod error;
mod lobby;
mod types;

pub use cards::{
    CardPlacement, CardPosition, CatalogCard, DeckName, DeckSummary,
    DraftCardView,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use lobby::{EventCategory, GameRoomPatch, GameRoomRecord, RosterEvent};
pub use types::{CardId, PushFrame, RoomId};
