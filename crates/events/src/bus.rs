//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Delivery is fire-and-forget: no acknowledgment, no retry, no replay for
//! late joiners. The subscriber registry is process-local, so in a
//! multi-instance deployment each process only observes events for mutations
//! it handled itself; clients resynchronize across that boundary by polling
//! list/status endpoints.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use scribepad_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// NoteEvent
// ---------------------------------------------------------------------------

/// A state transition broadcast to connected viewers.
///
/// Serialized as JSON with an internally-tagged `"kind"` discriminator; each
/// variant carries the identifiers a client needs plus a UTC timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum NoteEvent {
    #[serde(rename = "lock.acquired")]
    LockAcquired {
        note_id: DbId,
        holder: String,
        ttl_seconds: i64,
        timestamp: Timestamp,
    },

    #[serde(rename = "lock.renewed")]
    LockRenewed {
        note_id: DbId,
        holder: String,
        ttl_seconds: i64,
        timestamp: Timestamp,
    },

    #[serde(rename = "lock.released")]
    LockReleased { note_id: DbId, timestamp: Timestamp },

    #[serde(rename = "note.created")]
    NoteCreated { note_id: DbId, timestamp: Timestamp },

    #[serde(rename = "note.updated")]
    NoteUpdated { note_id: DbId, timestamp: Timestamp },

    #[serde(rename = "note.deleted")]
    NoteDeleted { note_id: DbId, timestamp: Timestamp },

    /// Distinct authenticated users currently connected to this instance.
    #[serde(rename = "connections.changed")]
    ConnectionsChanged { count: usize, timestamp: Timestamp },
}

impl NoteEvent {
    pub fn lock_acquired(note_id: DbId, holder: impl Into<String>, ttl_seconds: i64) -> Self {
        Self::LockAcquired {
            note_id,
            holder: holder.into(),
            ttl_seconds,
            timestamp: Utc::now(),
        }
    }

    pub fn lock_renewed(note_id: DbId, holder: impl Into<String>, ttl_seconds: i64) -> Self {
        Self::LockRenewed {
            note_id,
            holder: holder.into(),
            ttl_seconds,
            timestamp: Utc::now(),
        }
    }

    pub fn lock_released(note_id: DbId) -> Self {
        Self::LockReleased {
            note_id,
            timestamp: Utc::now(),
        }
    }

    pub fn note_created(note_id: DbId) -> Self {
        Self::NoteCreated {
            note_id,
            timestamp: Utc::now(),
        }
    }

    pub fn note_updated(note_id: DbId) -> Self {
        Self::NoteUpdated {
            note_id,
            timestamp: Utc::now(),
        }
    }

    pub fn note_deleted(note_id: DbId) -> Self {
        Self::NoteDeleted {
            note_id,
            timestamp: Utc::now(),
        }
    }

    pub fn connections_changed(count: usize) -> Self {
        Self::ConnectionsChanged {
            count,
            timestamp: Utc::now(),
        }
    }

    /// The note this event concerns, or `None` for note-agnostic events.
    ///
    /// Used by the WebSocket relay to scope delivery to room subscribers.
    pub fn note_id(&self) -> Option<DbId> {
        match self {
            Self::LockAcquired { note_id, .. }
            | Self::LockRenewed { note_id, .. }
            | Self::LockReleased { note_id, .. }
            | Self::NoteCreated { note_id, .. }
            | Self::NoteUpdated { note_id, .. }
            | Self::NoteDeleted { note_id, .. } => Some(*note_id),
            Self::ConnectionsChanged { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers independently
/// receive every published [`NoteEvent`].
pub struct EventBus {
    sender: broadcast::Sender<NoteEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer fills, the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Zero receivers is not an error; the event is simply dropped.
    pub fn publish(&self, event: NoteEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NoteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(NoteEvent::lock_acquired(42, "alpha", 300));

        let received = rx.recv().await.expect("should receive the event");
        match received {
            NoteEvent::LockAcquired {
                note_id,
                holder,
                ttl_seconds,
                ..
            } => {
                assert_eq!(note_id, 42);
                assert_eq!(holder, "alpha");
                assert_eq!(ttl_seconds, 300);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(NoteEvent::note_deleted(9));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(NoteEvent::lock_released(1));
    }

    #[test]
    fn events_carry_their_note_scope() {
        assert_eq!(NoteEvent::lock_released(5).note_id(), Some(5));
        assert_eq!(NoteEvent::note_updated(7).note_id(), Some(7));
        assert_eq!(NoteEvent::connections_changed(3).note_id(), None);
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_string(&NoteEvent::lock_acquired(5, "alpha", 300)).unwrap();
        assert!(json.contains(r#""kind":"lock.acquired"#));
        assert!(json.contains(r#""note_id":5"#));
        assert!(json.contains(r#""holder":"alpha"#));
        assert!(json.contains(r#""ttl_seconds":300"#));
        assert!(json.contains(r#""timestamp":"#));

        let json = serde_json::to_string(&NoteEvent::connections_changed(2)).unwrap();
        assert!(json.contains(r#""kind":"connections.changed"#));
        assert!(json.contains(r#""count":2"#));
    }
}
