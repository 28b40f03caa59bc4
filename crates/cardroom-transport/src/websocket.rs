//! WebSocket push channel using `tokio-tungstenite`.
//!
//! The backend pushes `{"type", "payload"}` frames over one websocket per
//! push room (`<base_url>/<room>`; room `"0"` is the lobby). The channel
//! keeps that socket alive in a background task, reconnecting after a
//! fixed delay, and fans frames out to its [`ListenerRegistry`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cardroom_protocol::{Codec, JsonCodec, PushFrame};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::{EventHandler, ListenerRegistry, PushChannel, SubscriptionId, TransportError};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Where and how the push channel connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushChannelConfig {
    /// Base websocket URL; the room is appended as the last path segment.
    pub base_url: String,

    /// Push room to join on connect.
    pub room: String,

    /// Pause between a lost connection and the next attempt.
    pub reconnect_delay: Duration,
}

impl Default for PushChannelConfig {
    fn default() -> Self {
        Self {
            base_url: "ws://localhost:8000/ws".to_string(),
            room: "0".to_string(),
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

impl PushChannelConfig {
    /// The full URL for `room`.
    pub fn url_for(&self, room: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), room)
    }
}

/// A [`PushChannel`] backed by a reconnecting websocket.
///
/// Subscriptions live in the registry, not in the socket, so they survive
/// reconnects and room switches.
pub struct WebSocketPushChannel {
    registry: Arc<ListenerRegistry>,
    room_tx: watch::Sender<String>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl WebSocketPushChannel {
    /// Starts connecting in the background and returns immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(config: PushChannelConfig) -> Self {
        let registry = Arc::new(ListenerRegistry::for_room(config.room.clone()));
        let (room_tx, room_rx) = watch::channel(config.room.clone());
        let connected = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());

        let task = tokio::spawn(run_connection(
            config,
            room_rx,
            Arc::clone(&registry),
            Arc::clone(&connected),
            Arc::clone(&shutdown),
        ));

        Self {
            registry,
            room_tx,
            connected,
            shutdown,
            task,
        }
    }

    /// Leaves the current push room and connects to `room`.
    ///
    /// Payloads tagged for the old room stop being delivered right away.
    pub fn join_room(&self, room: impl Into<String>) {
        let room = room.into();
        self.registry.set_room(room.clone());
        self.room_tx.send_replace(room);
    }

    /// The push room currently joined (or being joined).
    pub fn room(&self) -> String {
        self.room_tx.borrow().clone()
    }

    /// Returns `true` while a socket is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// The registry frames are dispatched through.
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Closes the socket and stops reconnecting.
    pub fn disconnect(&self) {
        self.shutdown.notify_one();
    }
}

impl PushChannel for WebSocketPushChannel {
    fn subscribe(
        &self,
        category: &str,
        handler: EventHandler,
    ) -> Result<SubscriptionId, TransportError> {
        self.registry.subscribe(category, handler)
    }

    fn unsubscribe(&self, category: &str, id: SubscriptionId) {
        self.registry.unsubscribe(category, id);
    }
}

impl Drop for WebSocketPushChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Why a connected socket stopped being read.
enum Outcome {
    Closed,
    RoomChanged,
    Shutdown,
}

async fn run_connection(
    config: PushChannelConfig,
    mut room_rx: watch::Receiver<String>,
    registry: Arc<ListenerRegistry>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    loop {
        let room = room_rx.borrow_and_update().clone();
        let url = config.url_for(&room);

        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((mut ws, _)) => {
                connected.store(true, Ordering::Release);
                tracing::info!(%room, "push channel connected");

                let outcome = pump(&mut ws, &registry, &mut room_rx, &shutdown).await;
                connected.store(false, Ordering::Release);
                tracing::info!(%room, "push channel disconnected");

                match outcome {
                    Outcome::Shutdown => {
                        let _ = ws.close(None).await;
                        return;
                    }
                    Outcome::RoomChanged => {
                        let _ = ws.close(None).await;
                        continue;
                    }
                    Outcome::Closed => {}
                }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "push channel connect failed");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            changed = room_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = shutdown.notified() => return,
        }
    }
}

async fn pump(
    ws: &mut WsStream,
    registry: &ListenerRegistry,
    room_rx: &mut watch::Receiver<String>,
    shutdown: &Notify,
) -> Outcome {
    loop {
        tokio::select! {
            _ = shutdown.notified() => return Outcome::Shutdown,
            changed = room_rx.changed() => {
                return match changed {
                    Ok(()) => Outcome::RoomChanged,
                    Err(_) => Outcome::Shutdown,
                };
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => dispatch(registry, text.as_bytes()),
                Some(Ok(Message::Binary(data))) => dispatch(registry, &data),
                Some(Ok(Message::Close(_))) | None => return Outcome::Closed,
                Some(Ok(_)) => continue, // ping/pong/frame
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "push channel read failed");
                    return Outcome::Closed;
                }
            },
        }
    }
}

fn dispatch(registry: &ListenerRegistry, data: &[u8]) {
    match JsonCodec.decode::<PushFrame>(data) {
        Ok(frame) => {
            let delivered = registry.emit(&frame.kind, &frame.payload);
            tracing::trace!(kind = %frame.kind, delivered, "push frame dispatched");
        }
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed push frame");
        }
    }
}
