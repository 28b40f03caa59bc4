//! Deck view configuration.

use cardroom_protocol::DeckName;
use serde::{Deserialize, Serialize};

/// Configuration for a [`DeckAggregator`](crate::DeckAggregator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// The deck whose placements make up the draft row.
    pub draft_deck: DeckName,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            draft_deck: DeckName::draft(),
        }
    }
}
