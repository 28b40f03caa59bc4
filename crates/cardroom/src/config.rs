//! Client configuration.

use std::time::Duration;

use cardroom_deck::{DeckAggregator, DeckConfig};
use cardroom_protocol::DeckName;
use cardroom_transport::{
    CatalogReader, PlacementReader, PushChannelConfig, RoomReader, WebSocketPushChannel,
};
use serde::{Deserialize, Serialize};

use crate::CardroomError;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the client core needs to know about its backend.
///
/// Defaults match a backend running locally on port 8000. Individual
/// values can be overridden from the environment with
/// [`from_env`](Self::from_env):
///
/// | variable | field |
/// |---|---|
/// | `CARDROOM_SERVER_URI` | `server_uri` |
/// | `CARDROOM_WS_URI` | `push.base_url` |
/// | `CARDROOM_ROOM` | `push.room` |
/// | `CARDROOM_RECONNECT_MS` | `push.reconnect_delay` |
/// | `CARDROOM_DRAFT_DECK` | `deck.draft_deck` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST resources.
    ///
    /// No HTTP client ships with this crate. The embedding application
    /// hands this URL to its own [`SnapshotSource`], [`RoomReader`],
    /// [`PlacementReader`] and [`CatalogReader`] implementations.
    ///
    /// [`SnapshotSource`]: cardroom_transport::SnapshotSource
    pub server_uri: String,

    /// The websocket push feed.
    pub push: PushChannelConfig,

    /// The deck panel.
    pub deck: DeckConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_uri: "http://localhost:8000".to_string(),
            push: PushChannelConfig::default(),
            deck: DeckConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by any `CARDROOM_*` variables that are set.
    pub fn from_env() -> Result<Self, CardroomError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CardroomError> {
        let mut config = Self::default();

        if let Some(uri) = lookup("CARDROOM_SERVER_URI") {
            config.server_uri = with_scheme("CARDROOM_SERVER_URI", uri, &["http://", "https://"])?;
        }
        if let Some(uri) = lookup("CARDROOM_WS_URI") {
            config.push.base_url = with_scheme("CARDROOM_WS_URI", uri, &["ws://", "wss://"])?;
        }
        if let Some(room) = lookup("CARDROOM_ROOM") {
            config.push.room = non_empty("CARDROOM_ROOM", room)?;
        }
        if let Some(ms) = lookup("CARDROOM_RECONNECT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|e| {
                CardroomError::Config(format!(
                    "CARDROOM_RECONNECT_MS: {ms:?} is not a number ({e})"
                ))
            })?;
            config.push.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(deck) = lookup("CARDROOM_DRAFT_DECK") {
            config.deck.draft_deck = DeckName(non_empty("CARDROOM_DRAFT_DECK", deck)?);
        }

        tracing::debug!(
            server_uri = %config.server_uri,
            push_url = %config.push.url_for(&config.push.room),
            draft_deck = %config.deck.draft_deck,
            "client configuration loaded"
        );
        Ok(config)
    }

    /// Starts the websocket push channel for the configured room.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn push_channel(&self) -> WebSocketPushChannel {
        WebSocketPushChannel::connect(self.push.clone())
    }

    /// A deck aggregator over the given readers, using the configured
    /// draft deck.
    pub fn deck_aggregator<R, P, K>(
        &self,
        rooms: R,
        placements: P,
        catalog: K,
    ) -> DeckAggregator<R, P, K>
    where
        R: RoomReader,
        P: PlacementReader,
        K: CatalogReader,
    {
        DeckAggregator::new(rooms, placements, catalog).with_config(self.deck.clone())
    }
}

fn non_empty(key: &str, value: String) -> Result<String, CardroomError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CardroomError::Config(format!("{key} is empty")));
    }
    Ok(trimmed.to_string())
}

fn with_scheme(key: &str, value: String, schemes: &[&str]) -> Result<String, CardroomError> {
    let value = non_empty(key, value)?;
    if !schemes.iter().any(|s| value.starts_with(s)) {
        return Err(CardroomError::Config(format!(
            "{key}: {value:?} must start with one of {schemes:?}"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}
