//! Note entity model, DTOs, and edit outcomes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use scribepad_core::types::{DbId, Timestamp};

/// A note row joined with the owner's and (if locked) the locker's username.
///
/// The lock columns here are the raw stored state; clients that need the
/// authoritative, lazily-expired view use the lock status endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub owner_id: DbId,
    pub owner_name: String,
    pub locked_by: Option<DbId>,
    pub locked_by_name: Option<String>,
    pub lock_acquired_at: Option<Timestamp>,
    pub lock_lease_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a note.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNote {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// DTO for updating a note's content.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNote {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Outcome of an edit attempt, which requires the caller's live lock.
#[derive(Debug)]
pub enum EditOutcome {
    Updated(Note),
    /// The caller is not the recorded lock holder (including the unlocked case).
    NotHolder,
    /// The caller is the recorded holder but the lease has lapsed.
    LeaseExpired,
    NoteMissing,
}
