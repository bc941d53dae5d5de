//! The exclusive note lock as its own logical entity.
//!
//! Physically the lock lives as three nullable columns on the note row, but
//! all code reads and writes it through these types so the acquire, release,
//! and sweep algorithms never touch unrelated note fields.

use serde::Serialize;
use sqlx::FromRow;

use scribepad_core::types::{DbId, Timestamp};

/// A recorded lock, with the holder's username resolved for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NoteLock {
    pub note_id: DbId,
    pub holder_id: DbId,
    pub holder_name: String,
    pub acquired_at: Timestamp,
    /// Refreshed on every renewal; lock age is measured from this stamp.
    pub lease_at: Timestamp,
}

/// Outcome of an acquire attempt.
#[derive(Debug)]
pub enum LockAttempt {
    /// A fresh lock was written (unlocked, own-expired, or stolen-expired).
    Acquired(NoteLock),
    /// The caller's live lock had its lease stamp refreshed.
    Renewed(NoteLock),
    /// A different holder's lock is still live; nothing was written.
    Conflict(NoteLock),
    NoteMissing,
}

/// Outcome of a release attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum LockRelease {
    Released,
    /// The store does not record the caller as the lock holder.
    NotHolder,
    NoteMissing,
}
