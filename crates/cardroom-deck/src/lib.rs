//! Deck and draft views for the cardroom client.
//!
//! Inside a game the client shows the draw and discard piles, the card on
//! top of the discard pile, and the draft row. Each of these joins data
//! from the room, placement and catalog resources, and each degrades on
//! its own when a read fails:
//!
//! - the discard-top image is a strictly sequential chain (room, then top
//!   placement, then catalog) and fails closed: any failed step means no
//!   image at all
//! - the draft row fans out one catalog lookup per card and fails open
//!   per card: a card whose lookup fails is shown without its image
//!
//! Failures never reach the caller. They go to a
//! [`DiagnosticsSink`](cardroom_transport::DiagnosticsSink) instead.

mod aggregator;
mod config;

pub use aggregator::{DeckAggregator, DeckView};
pub use config::DeckConfig;
