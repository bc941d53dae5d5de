use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

use scribepad_core::types::{DbId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user behind this connection. Connections are only
    /// registered after token validation, so this is never a guess.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Note rooms this connection has joined. Empty means the connection is
    /// a global subscriber and receives every event.
    pub rooms: HashSet<DbId>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections for this process.
///
/// This registry is process-local by design: in a multi-instance deployment
/// each instance only fans out events for mutations it handled itself.
/// Thread-safe via interior `RwLock`; wrap in `Arc` to share.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new authenticated connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            rooms: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Add a note room to a connection's subscription set.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn join_room(&self, conn_id: &str, note_id: DbId) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => {
                conn.rooms.insert(note_id);
                true
            }
            None => false,
        }
    }

    /// Remove a note room from a connection's subscription set.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn leave_room(&self, conn_id: &str, note_id: DbId) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => {
                conn.rooms.remove(&note_id);
                true
            }
            None => false,
        }
    }

    /// Broadcast a message to every connection.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they are cleaned up by their own receive loops).
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Broadcast a message subject to room scoping.
    ///
    /// With `note_id = None` the message goes to everyone. Otherwise it goes
    /// to connections that either joined that note's room or joined no rooms
    /// at all (global subscribers).
    pub async fn broadcast_scoped(&self, note_id: Option<DbId>, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let in_scope = match note_id {
                None => true,
                Some(id) => conn.rooms.is_empty() || conn.rooms.contains(&id),
            };
            if in_scope {
                let _ = conn.sender.send(message.clone());
            }
        }
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == user_id {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return the number of distinct users currently connected.
    ///
    /// A user with several tabs open counts once; this is the figure
    /// broadcast in `connections.changed` events.
    pub async fn user_count(&self) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .map(|conn| conn.user_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a Close frame to every connection, then clear the registry.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
