//! Lobby roster reconciliation for the cardroom client.
//!
//! A lobby view shows the list of game rooms. That list is built from one
//! REST snapshot and then kept current by `gameAdd`, `gameRemove` and
//! `gameUpdate` push events that may arrive interleaved with the snapshot
//! and with each other.
//!
//! # Key types
//!
//! - [`RosterReconciler`]: the merge rules (idempotent add, shallow
//!   update, no-op on unknown ids), pure and synchronous
//! - [`RosterState`]: the ordered, id-unique list it owns
//! - [`LobbyRoster`]: one mounted lobby view: subscriptions, the
//!   snapshot load, event application, change notification, `dispose`
//!
//! # Ordering
//!
//! Events are applied in the order the channel delivers them. Nothing is
//! reordered or coalesced, and events carry no sequence numbers, so the
//! final state after out-of-order delivery is whatever arrival order
//! produces.

mod lobby;
mod reconciler;

pub use lobby::{LobbyRoster, RosterView};
pub use reconciler::{RosterReconciler, RosterState};
