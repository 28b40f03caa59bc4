//! A mounted lobby view.
//!
//! [`LobbyRoster::mount`] registers one listener per lobby event category
//! and spawns a task that owns the [`RosterReconciler`]. Listeners only
//! decode payloads and queue them; the task loads the snapshot, then
//! applies queued events one at a time and publishes each new state on a
//! `watch` channel. The renderer reads the latest state and awaits
//! changes; it never touches the roster itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardroom_protocol::{EventCategory, RosterEvent};
use cardroom_transport::{
    Diagnostic, DiagnosticsSink, EventHandler, PushChannel, SnapshotSource, SubscriptionId,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Notify, mpsc, watch};

use crate::{RosterReconciler, RosterState};

/// What the renderer sees: the roster, and whether the snapshot is still
/// loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterView {
    pub loading: bool,
    pub rooms: RosterState,
}

/// One lobby view's roster, kept current from a push channel.
///
/// Dropping the handle disposes it.
pub struct LobbyRoster<C: PushChannel> {
    channel: Arc<C>,
    subscriptions: Mutex<Vec<(EventCategory, SubscriptionId)>>,
    disposal: Arc<Disposal>,
    shutdown: Arc<Notify>,
    view: watch::Receiver<RosterView>,
}

impl<C: PushChannel> LobbyRoster<C> {
    /// Subscribes to the lobby categories on `channel` and starts loading
    /// the snapshot from `source`.
    ///
    /// Listeners are registered before the snapshot request goes out.
    /// Events they receive while the load is pending are queued and
    /// applied, in arrival order, once the snapshot is installed. A failed
    /// subscription is reported to `sink`; the remaining categories and
    /// the snapshot load go ahead regardless.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount<S: SnapshotSource>(
        source: S,
        channel: Arc<C>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let disposal = Arc::new(Disposal::default());
        let shutdown = Arc::new(Notify::new());

        let mut subscriptions = Vec::with_capacity(EventCategory::ALL.len());
        for category in EventCategory::ALL {
            let handler = event_handler(
                category,
                event_tx.clone(),
                Arc::clone(&disposal),
                Arc::clone(&sink),
            );
            match channel.subscribe(category.as_str(), handler) {
                Ok(id) => subscriptions.push((category, id)),
                Err(error) => sink.report(Diagnostic::SubscribeFailed { category, error }),
            }
        }

        let (view_tx, view_rx) = watch::channel(RosterView {
            loading: true,
            rooms: RosterState::default(),
        });

        let actor = RosterActor {
            reconciler: RosterReconciler::new(),
            events: event_rx,
            view: view_tx,
            disposal: Arc::clone(&disposal),
            shutdown: Arc::clone(&shutdown),
            sink,
        };
        tokio::spawn(actor.run(source));

        Self {
            channel,
            subscriptions: Mutex::new(subscriptions),
            disposal,
            shutdown,
            view: view_rx,
        }
    }

    /// The roster as of the last applied change.
    pub fn current_state(&self) -> RosterState {
        self.view.borrow().rooms.clone()
    }

    /// The full view, including the loading flag.
    pub fn view(&self) -> RosterView {
        self.view.borrow().clone()
    }

    /// Returns `true` until the snapshot load has finished (successfully
    /// or not).
    pub fn is_loading(&self) -> bool {
        self.view.borrow().loading
    }

    /// A receiver that is notified on every roster change.
    pub fn changes(&self) -> watch::Receiver<RosterView> {
        self.view.clone()
    }

    /// Waits until the snapshot has been installed. Returns early if the
    /// roster is disposed first.
    pub async fn wait_loaded(&self) {
        let mut rx = self.view.clone();
        let _ = rx.wait_for(|view| !view.loading).await;
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposal.is_set()
    }

    /// Unsubscribes every lobby listener and stops applying events.
    ///
    /// Safe to call more than once. Only subscriptions that actually
    /// succeeded are removed. Listeners the channel still invokes
    /// afterwards (a delivery already in flight) do nothing.
    ///
    /// Once this returns, the roster no longer changes: an event the task
    /// is applying at the moment of the call is either published before
    /// `dispose` returns or not at all.
    pub fn dispose(&self) {
        let first = self.disposal.set();

        let subscriptions = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for (category, id) in subscriptions {
            self.channel.unsubscribe(category.as_str(), id);
        }
        self.shutdown.notify_one();

        if first {
            tracing::info!("lobby roster disposed");
        }
    }
}

impl<C: PushChannel> Drop for LobbyRoster<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Builds the listener for one category: decode, then queue.
fn event_handler(
    category: EventCategory,
    events: mpsc::UnboundedSender<RosterEvent>,
    disposal: Arc<Disposal>,
    sink: Arc<dyn DiagnosticsSink>,
) -> EventHandler {
    Arc::new(move |payload: &Value| {
        if disposal.is_set() {
            tracing::trace!(%category, "event after dispose ignored");
            return;
        }
        match RosterEvent::decode(category, payload) {
            Ok(event) => {
                let _ = events.send(event);
            }
            Err(error) => sink.report(Diagnostic::EventRejected { category, error }),
        }
    })
}

/// The task that owns the reconciler.
struct RosterActor {
    reconciler: RosterReconciler,
    events: mpsc::UnboundedReceiver<RosterEvent>,
    view: watch::Sender<RosterView>,
    disposal: Arc<Disposal>,
    shutdown: Arc<Notify>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl RosterActor {
    async fn run<S: SnapshotSource>(mut self, source: S) {
        tracing::debug!("lobby roster started");

        tokio::select! {
            _ = self.shutdown.notified() => {
                tracing::debug!("lobby roster disposed while loading");
                return;
            }
            _ = self.reconciler.load_snapshot(&source, self.sink.as_ref()) => {}
        }
        if !self.publish_unless_disposed() {
            return;
        }

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    if !self.apply_unless_disposed(event) {
                        break;
                    }
                }
            }
        }

        tracing::debug!("lobby roster stopped");
    }

    /// Applies `event` and publishes the result, all under the disposal
    /// lock. Returns `false`, without applying, once disposed.
    fn apply_unless_disposed(&mut self, event: RosterEvent) -> bool {
        let disposed = self.disposal.lock();
        if *disposed {
            return false;
        }
        let room = event.room_id();
        let category = event.category();
        if self.reconciler.apply(event) {
            tracing::debug!(%room, %category, "roster changed");
            self.publish();
        }
        true
    }

    fn publish_unless_disposed(&self) -> bool {
        let disposed = self.disposal.lock();
        if *disposed {
            return false;
        }
        self.publish();
        true
    }

    fn publish(&self) {
        self.view.send_replace(RosterView {
            loading: false,
            rooms: self.reconciler.current_state().clone(),
        });
    }
}

/// The disposed flag, shared by the handle, its listeners and the task.
///
/// The task holds the lock from its check through apply and publish, and
/// `dispose` takes the same lock to set the flag.
#[derive(Debug, Default)]
struct Disposal(Mutex<bool>);

impl Disposal {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Sets the flag. Returns `true` on the first call only.
    fn set(&self) -> bool {
        !std::mem::replace(&mut *self.lock(), true)
    }
}
