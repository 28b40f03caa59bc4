//! Read-side collaborators: the REST resources the client consumes.
//!
//! The client core never speaks HTTP itself. Each backend resource is a
//! trait here; production code plugs in an HTTP client, tests plug in
//! in-memory fakes. Every method returns a `Send` future so callers can
//! drive it from a spawned task.

use std::future::Future;
use std::sync::Arc;

use cardroom_protocol::{
    CardId, CardPlacement, CatalogCard, DeckName, GameRoomRecord, RoomId,
};

use crate::TransportError;

/// "List all game rooms": the lobby snapshot.
pub trait SnapshotSource: Send + Sync + 'static {
    fn list_rooms(
        &self,
    ) -> impl Future<Output = Result<Vec<GameRoomRecord>, TransportError>> + Send;
}

/// "Get room by id": room state including pile counters.
pub trait RoomReader: Send + Sync + 'static {
    fn get_room(
        &self,
        room: RoomId,
    ) -> impl Future<Output = Result<GameRoomRecord, TransportError>> + Send;
}

/// Card placements of a room.
pub trait PlacementReader: Send + Sync + 'static {
    /// The placement on top of the discard pile. `Ok(None)` when the
    /// pile is empty.
    fn top_discard(
        &self,
        room: RoomId,
    ) -> impl Future<Output = Result<Option<CardPlacement>, TransportError>> + Send;

    /// Every placement in the named deck of a room. An empty deck is
    /// `Ok(vec![])`, not an error.
    fn placements_in_deck(
        &self,
        room: RoomId,
        deck: &DeckName,
    ) -> impl Future<Output = Result<Vec<CardPlacement>, TransportError>> + Send;
}

/// "Get card by id": the card catalog.
pub trait CatalogReader: Send + Sync + 'static {
    fn get_card(
        &self,
        card: CardId,
    ) -> impl Future<Output = Result<CatalogCard, TransportError>> + Send;
}

// Shared handles forward to the inner collaborator, so one client can
// back several views.

impl<T: SnapshotSource> SnapshotSource for Arc<T> {
    fn list_rooms(
        &self,
    ) -> impl Future<Output = Result<Vec<GameRoomRecord>, TransportError>> + Send {
        (**self).list_rooms()
    }
}

impl<T: RoomReader> RoomReader for Arc<T> {
    fn get_room(
        &self,
        room: RoomId,
    ) -> impl Future<Output = Result<GameRoomRecord, TransportError>> + Send {
        (**self).get_room(room)
    }
}

impl<T: PlacementReader> PlacementReader for Arc<T> {
    fn top_discard(
        &self,
        room: RoomId,
    ) -> impl Future<Output = Result<Option<CardPlacement>, TransportError>> + Send {
        (**self).top_discard(room)
    }

    fn placements_in_deck(
        &self,
        room: RoomId,
        deck: &DeckName,
    ) -> impl Future<Output = Result<Vec<CardPlacement>, TransportError>> + Send {
        (**self).placements_in_deck(room, deck)
    }
}

impl<T: CatalogReader> CatalogReader for Arc<T> {
    fn get_card(
        &self,
        card: CardId,
    ) -> impl Future<Output = Result<CatalogCard, TransportError>> + Send {
        (**self).get_card(card)
    }
}
