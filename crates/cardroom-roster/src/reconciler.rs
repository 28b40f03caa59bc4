//! The roster merge rules.

use cardroom_protocol::{GameRoomPatch, GameRoomRecord, RoomId, RosterEvent};
use cardroom_transport::{Diagnostic, DiagnosticsSink, SnapshotSource};
use serde::Serialize;

// ---------------------------------------------------------------------------
// RosterState
// ---------------------------------------------------------------------------

/// The game rooms known to one lobby view.
///
/// Insertion order is kept; updates happen in place. At most one record
/// per id is ever present. Only [`RosterReconciler`] can change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RosterState(Vec<GameRoomRecord>);

impl RosterState {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameRoomRecord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[GameRoomRecord] {
        &self.0
    }

    /// The record with the given id, if present.
    pub fn get(&self, id: RoomId) -> Option<&GameRoomRecord> {
        self.0.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.get(id).is_some()
    }

    /// Room ids in display order.
    pub fn ids(&self) -> Vec<RoomId> {
        self.0.iter().map(|r| r.id).collect()
    }

    fn position(&self, id: RoomId) -> Option<usize> {
        self.0.iter().position(|r| r.id == id)
    }
}

impl<'a> IntoIterator for &'a RosterState {
    type Item = &'a GameRoomRecord;
    type IntoIter = std::slice::Iter<'a, GameRoomRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// RosterReconciler
// ---------------------------------------------------------------------------

/// Owns a [`RosterState`] and applies snapshots and events to it.
///
/// Every `apply_*` method returns whether the state changed, so callers
/// can skip redundant change notifications. Events for unknown ids and
/// duplicate adds are no-ops, never errors.
#[derive(Debug, Default)]
pub struct RosterReconciler {
    state: RosterState,
}

impl RosterReconciler {
    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live roster, for rendering.
    pub fn current_state(&self) -> &RosterState {
        &self.state
    }

    /// Replaces the roster with a snapshot.
    ///
    /// If the snapshot lists an id twice, the first occurrence wins.
    pub fn install_snapshot(&mut self, records: Vec<GameRoomRecord>) {
        let mut state = RosterState(Vec::with_capacity(records.len()));
        for record in records {
            if !state.contains(record.id) {
                state.0.push(record);
            }
        }
        self.state = state;
    }

    /// Fetches the full room list from `source` and installs it.
    ///
    /// A failed fetch is reported to `sink` and leaves an empty roster;
    /// it never reaches the caller.
    pub async fn load_snapshot<S: SnapshotSource>(
        &mut self,
        source: &S,
        sink: &dyn DiagnosticsSink,
    ) -> &RosterState {
        match source.list_rooms().await {
            Ok(records) => {
                tracing::debug!(rooms = records.len(), "lobby snapshot loaded");
                self.install_snapshot(records);
            }
            Err(error) => {
                sink.report(Diagnostic::SnapshotFailed { error });
                self.install_snapshot(Vec::new());
            }
        }
        &self.state
    }

    /// Applies one event. This is the single typed entry point the push
    /// channel feeds.
    pub fn apply(&mut self, event: RosterEvent) -> bool {
        match event {
            RosterEvent::Added(record) => self.apply_added(record),
            RosterEvent::Removed(id) => self.apply_removed(id),
            RosterEvent::Updated(patch) => self.apply_updated(&patch),
        }
    }

    /// Appends `record` unless its id is already present, in which case
    /// the existing record is kept untouched.
    pub fn apply_added(&mut self, record: GameRoomRecord) -> bool {
        if self.state.contains(record.id) {
            tracing::trace!(room = %record.id, "duplicate add ignored");
            return false;
        }
        self.state.0.push(record);
        true
    }

    /// Merges `patch` into the record with the same id. Never creates a
    /// record.
    pub fn apply_updated(&mut self, patch: &GameRoomPatch) -> bool {
        match self.state.0.iter_mut().find(|r| r.id == patch.id) {
            Some(record) => {
                let before = record.clone();
                record.merge(patch);
                *record != before
            }
            None => {
                tracing::trace!(room = %patch.id, "update for unknown room ignored");
                false
            }
        }
    }

    /// Deletes the record with `id`, if present.
    pub fn apply_removed(&mut self, id: RoomId) -> bool {
        match self.state.position(id) {
            Some(index) => {
                self.state.0.remove(index);
                true
            }
            None => false,
        }
    }
}
