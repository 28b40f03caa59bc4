//! Structured reporting of swallowed failures.
//!
//! Roster and deck operations never return errors to the renderer. What
//! they do instead is hand a [`Diagnostic`] to an injected
//! [`DiagnosticsSink`]: production logs it, tests record it.

use std::fmt;
use std::sync::Mutex;

use cardroom_protocol::{CardId, EventCategory, ProtocolError, RoomId};

use crate::TransportError;

/// Which read of the discard-top chain failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardStage {
    /// Reading the room record.
    Room,
    /// Reading the top-of-discard placement.
    Placement,
    /// Reading the card from the catalog.
    Catalog,
}

impl fmt::Display for DiscardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room => write!(f, "room"),
            Self::Placement => write!(f, "placement"),
            Self::Catalog => write!(f, "catalog"),
        }
    }
}

/// A failure that was absorbed instead of surfaced.
#[derive(Debug)]
pub enum Diagnostic {
    /// The lobby snapshot could not be loaded; the roster starts empty.
    SnapshotFailed { error: TransportError },

    /// A lobby listener could not be registered.
    SubscribeFailed {
        category: EventCategory,
        error: TransportError,
    },

    /// A push payload did not decode as its category's event.
    EventRejected {
        category: EventCategory,
        error: ProtocolError,
    },

    /// The discard-top image chain aborted.
    DiscardTopUnavailable {
        room: RoomId,
        stage: DiscardStage,
        error: TransportError,
    },

    /// The room read behind the pile counters failed.
    DeckCountsUnavailable { room: RoomId, error: TransportError },

    /// The draft placement list could not be read; no cards are shown.
    DraftListFailed { room: RoomId, error: TransportError },

    /// One draft card's catalog lookup failed; it is shown bare.
    EnrichmentFailed {
        room: RoomId,
        card: CardId,
        error: TransportError,
    },
}

/// Receives diagnostics. Must be cheap and must not panic.
///
/// Roster and deck operations call `report` inline, in the middle of their
/// own work: from inside a push listener, from the lobby task, or from one
/// of several concurrent catalog lookups. A sink that blocks stalls that
/// work, and a sink that panics takes the calling task down with it.
///
/// `Send + Sync + 'static` because a single sink is usually shared, as an
/// `Arc<dyn DiagnosticsSink>`, by every view of the client.
///
/// ```rust
/// use std::sync::Arc;
///
/// use cardroom_protocol::RoomId;
/// use cardroom_transport::{Diagnostic, DiagnosticsSink, MemorySink, TransportError};
///
/// let sink: Arc<MemorySink> = Arc::new(MemorySink::new());
/// sink.report(Diagnostic::DeckCountsUnavailable {
///     room: RoomId(3),
///     error: TransportError::http(404, Some("Game not found")),
/// });
/// assert_eq!(sink.len(), 1);
/// ```
pub trait DiagnosticsSink: Send + Sync + 'static {
    /// Takes ownership of one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs every diagnostic through `tracing`.
///
/// Failures that empty out a whole view log at `warn`; per-item or
/// per-event failures log at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::SnapshotFailed { error } => {
                tracing::warn!(error = %error, "lobby snapshot failed, starting empty");
            }
            Diagnostic::SubscribeFailed { category, error } => {
                tracing::warn!(%category, error = %error, "lobby subscription failed");
            }
            Diagnostic::EventRejected { category, error } => {
                tracing::debug!(%category, error = %error, "push payload rejected");
            }
            Diagnostic::DiscardTopUnavailable { room, stage, error } => {
                tracing::warn!(%room, %stage, error = %error, "discard top unavailable");
            }
            Diagnostic::DeckCountsUnavailable { room, error } => {
                tracing::warn!(%room, error = %error, "deck counts unavailable");
            }
            Diagnostic::DraftListFailed { room, error } => {
                tracing::warn!(%room, error = %error, "draft list unavailable");
            }
            Diagnostic::EnrichmentFailed { room, card, error } => {
                tracing::debug!(%room, %card, error = %error, "draft card left unenriched");
            }
        }
    }
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}
