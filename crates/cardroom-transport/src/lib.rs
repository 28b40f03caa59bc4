//! Backend collaborators for the cardroom client.
//!
//! The client core consumes four REST resources and one push channel.
//! This crate describes them as traits ([`SnapshotSource`],
//! [`RoomReader`], [`PlacementReader`], [`CatalogReader`],
//! [`PushChannel`]) so the roster and deck logic never depends on how
//! bytes move. It also ships:
//!
//! - [`ListenerRegistry`]: an in-process push channel with room scoping
//! - [`WebSocketPushChannel`]: the backend's websocket push feed
//! - [`DiagnosticsSink`]: where swallowed failures are reported
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket push channel via `tokio-tungstenite`

mod diagnostics;
mod error;
mod push;
mod sources;
#[cfg(feature = "websocket")]
mod websocket;

pub use diagnostics::{Diagnostic, DiagnosticsSink, DiscardStage, MemorySink, TracingSink};
pub use error::TransportError;
pub use push::{EventHandler, ListenerRegistry, PushChannel};
pub use sources::{CatalogReader, PlacementReader, RoomReader, SnapshotSource};
#[cfg(feature = "websocket")]
pub use websocket::{PushChannelConfig, WebSocketPushChannel};

use std::fmt;

/// Opaque identifier of one push-channel subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new `SubscriptionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}
