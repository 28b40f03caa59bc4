//! # Cardroom
//!
//! Client core for the cardroom card game.
//!
//! The renderer needs two things from the backend: the lobby's list of
//! joinable rooms, kept current as rooms come and go, and the deck panel
//! of a room in play. Both are built here from the backend's REST
//! resources and its websocket push feed, and neither ever hands an error
//! to the renderer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cardroom::prelude::*;
//!
//! # async fn run(lobby_source: impl SnapshotSource) -> Result<(), CardroomError> {
//! cardroom::init_tracing("info")?;
//! let config = ClientConfig::from_env()?;
//!
//! let push = Arc::new(config.push_channel());
//! let roster = LobbyRoster::mount(lobby_source, push, Arc::new(TracingSink));
//! roster.wait_loaded().await;
//! for room in roster.current_state().iter() {
//!     println!("{} {}/{}", room.name, room.current_players, room.max_players);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod telemetry;

pub use config::ClientConfig;
pub use error::CardroomError;
pub use telemetry::init_tracing;

/// Convenient imports for client code.
pub mod prelude {
    pub use crate::{CardroomError, ClientConfig, init_tracing};

    pub use cardroom_deck::{DeckAggregator, DeckConfig, DeckView};
    pub use cardroom_protocol::{
        CardId, CardPlacement, CardPosition, CatalogCard, DeckName, DeckSummary, DraftCardView,
        EventCategory, GameRoomPatch, GameRoomRecord, ProtocolError, RoomId, RosterEvent,
    };
    pub use cardroom_roster::{LobbyRoster, RosterReconciler, RosterState, RosterView};
    pub use cardroom_transport::{
        CatalogReader, Diagnostic, DiagnosticsSink, ListenerRegistry, MemorySink,
        PlacementReader, PushChannel, PushChannelConfig, RoomReader, SnapshotSource,
        TracingSink, TransportError, WebSocketPushChannel,
    };
}
