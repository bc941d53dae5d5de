//! Bus-to-WebSocket event relay.
//!
//! [`EventRelay`] subscribes to the event bus and fans each event out through
//! the connection registry, honoring room scoping. Delivery is best-effort:
//! there is no acknowledgment, no retry, and no backlog for late joiners --
//! a reconnecting client resynchronizes through list/status calls.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use scribepad_events::NoteEvent;

use crate::ws::WsManager;

/// Forwards bus events to connected WebSocket clients.
pub struct EventRelay {
    ws_manager: Arc<WsManager>,
}

impl EventRelay {
    /// Create a relay over the given connection registry.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel closes, i.e. when the
    /// [`EventBus`](scribepad_events::EventBus) is dropped during shutdown.
    pub async fn run(self, mut receiver: broadcast::Receiver<NoteEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    self.ws_manager
                        .broadcast_scoped(event.note_id(), Message::Text(text.into()))
                        .await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, relay shutting down");
                    break;
                }
            }
        }
    }
}
