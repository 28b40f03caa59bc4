//! The push-event channel and an in-process listener registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardroom_protocol::PushFrame;
use serde_json::Value;

use crate::{SubscriptionId, TransportError};

/// A listener for one event category. Receives the raw payload.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Subscribe/unsubscribe by named event category.
///
/// Delivery is at most once per emission. No ordering is promised across
/// categories.
///
/// ## Handlers
///
/// A handler is an [`EventHandler`]: a shared closure that receives the raw
/// JSON payload of one event. The channel may call it from any thread,
/// including the websocket task's, and possibly while another thread is
/// calling `unsubscribe` for it. Handlers therefore have to be
/// `Send + Sync`, and a handler that must stop reacting at a precise moment
/// needs its own flag; removing it from the channel only stops *future*
/// deliveries.
///
/// ## Trait bounds explained
///
/// - `Send + Sync`: one channel is shared by every view that listens to it,
///   usually behind an `Arc`, and each view may live on a different worker
///   thread.
/// - `'static`: views hold the channel for as long as they are mounted, so
///   it cannot borrow anything shorter-lived.
///
/// Both operations are synchronous. Subscribing only touches the local
/// listener table; it never waits on the network.
pub trait PushChannel: Send + Sync + 'static {
    /// Registers `handler` for `category` and returns the id needed to
    /// remove it again.
    fn subscribe(
        &self,
        category: &str,
        handler: EventHandler,
    ) -> Result<SubscriptionId, TransportError>;

    /// Removes a handler. Unknown ids are ignored.
    fn unsubscribe(&self, category: &str, id: SubscriptionId);
}

/// Per-category handler lists with room scoping.
///
/// Connection-backed channels feed decoded frames into [`emit`](Self::emit);
/// on its own the registry works as a local, in-process channel.
///
/// When a room is set, payloads tagged with a different `room` are
/// dropped before any handler sees them. Untagged payloads always pass.
pub struct ListenerRegistry {
    room: Mutex<Option<String>>,
    listeners: Mutex<HashMap<String, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// A registry that delivers every payload regardless of its room tag.
    pub fn new() -> Self {
        Self {
            room: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// A registry scoped to `room`.
    pub fn for_room(room: impl Into<String>) -> Self {
        let registry = Self::new();
        registry.set_room(room);
        registry
    }

    /// Changes the room payloads are filtered against.
    pub fn set_room(&self, room: impl Into<String>) {
        *lock(&self.room) = Some(room.into());
    }

    /// The room payloads are filtered against, if any.
    pub fn room(&self) -> Option<String> {
        lock(&self.room).clone()
    }

    /// Number of handlers registered for `category`.
    pub fn handler_count(&self, category: &str) -> usize {
        lock(&self.listeners).get(category).map_or(0, Vec::len)
    }

    /// Delivers `payload` to every handler of `category`, in registration
    /// order. Returns how many handlers were called.
    ///
    /// Handlers run after the registry lock is released, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    pub fn emit(&self, category: &str, payload: &Value) -> usize {
        if let Some(tag) = PushFrame::payload_room_tag(payload) {
            if let Some(room) = lock(&self.room).as_deref() {
                if tag != room {
                    tracing::trace!(category, %tag, room, "payload for another room, dropped");
                    return 0;
                }
            }
        }

        let handlers: Vec<EventHandler> = match lock(&self.listeners).get(category) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PushChannel for ListenerRegistry {
    fn subscribe(
        &self,
        category: &str,
        handler: EventHandler,
    ) -> Result<SubscriptionId, TransportError> {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners)
            .entry(category.to_string())
            .or_default()
            .push((id, handler));
        tracing::debug!(category, %id, "listener subscribed");
        Ok(id)
    }

    fn unsubscribe(&self, category: &str, id: SubscriptionId) {
        let mut listeners = lock(&self.listeners);
        if let Some(list) = listeners.get_mut(category) {
            list.retain(|(sid, _)| *sid != id);
            if list.is_empty() {
                listeners.remove(category);
            }
        }
    }
}

/// Handlers never run under these locks, so a poisoned lock still holds
/// consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
