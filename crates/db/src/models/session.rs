//! Session lease model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use scribepad_core::types::{DbId, Timestamp};

/// A session lease row from the `sessions` table.
///
/// The lease is sliding: every validated request bumps `last_activity` and
/// recomputes `expires_at`. A row whose `expires_at` has passed, or whose
/// `last_activity` is older than the session TTL, is dead regardless of
/// whether the sweeper has deleted it yet.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating a new session lease.
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
