//! Client-to-server WebSocket subscription protocol.
//!
//! Connected clients scope their event feed by joining per-note rooms. A
//! connection that never joins a room receives every event; one that has
//! joined rooms receives only those notes' events (plus note-agnostic events
//! such as connection counts).

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Messages a connected client may send over the WebSocket.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator so
/// clients can route by type string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Narrow the event feed to this note (may be sent for several notes).
    #[serde(rename = "note.join")]
    NoteJoin { note_id: DbId },

    /// Stop receiving this note's events.
    #[serde(rename = "note.leave")]
    NoteLeave { note_id: DbId },
}
