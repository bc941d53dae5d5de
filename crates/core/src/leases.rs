//! Lease arithmetic for session and lock TTLs.
//!
//! Lazy expiry is the authoritative mechanism everywhere: a lease whose age
//! has reached its TTL is treated as gone the moment it is read, whether or
//! not the reconciliation sweeper has cleared the stored row yet. The sweeper
//! only reclaims storage and notifies viewers; it is never load-bearing for
//! correctness.

use chrono::Duration;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// TTL defaults
// ---------------------------------------------------------------------------

/// Sliding session lease lifetime in minutes.
pub const DEFAULT_SESSION_TTL_MINS: i64 = 30;

/// Exclusive note lock lifetime in minutes.
///
/// Much shorter than the session TTL: a lock can lapse while its owning
/// session stays alive, so active editors renew locks on their own cadence
/// rather than riding on session heartbeats.
pub const DEFAULT_LOCK_TTL_MINS: i64 = 5;

/// Interval between reconciliation sweeps in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Expiry math
// ---------------------------------------------------------------------------

/// Returns `true` once a lease stamped at `lease_at` has reached `ttl_mins`.
pub fn is_expired(lease_at: Timestamp, ttl_mins: i64, now: Timestamp) -> bool {
    now - lease_at >= Duration::minutes(ttl_mins)
}

/// Seconds of validity left for a lease, clamped at zero.
pub fn remaining_seconds(lease_at: Timestamp, ttl_mins: i64, now: Timestamp) -> i64 {
    (ttl_mins * 60 - (now - lease_at).num_seconds()).max(0)
}

// ---------------------------------------------------------------------------
// Acquire decision
// ---------------------------------------------------------------------------

/// What an acquire attempt should do with the lock row it read under
/// row-level exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDecision {
    /// No live lock exists -- write a fresh one for the caller. Covers the
    /// unlocked case, the caller's own expired lock, and stealing another
    /// holder's expired lock.
    Take,
    /// The caller already holds a live lock -- refresh its lease timestamp
    /// without changing holder or acquisition time.
    Refresh,
    /// A different holder's lock is still live -- reject without writing.
    Reject,
}

/// Decide an acquire attempt from the currently recorded `(holder, lease_at)`.
///
/// Pure so the rule can be tested without a database; the repository runs it
/// between the `FOR UPDATE` read and the conditional write.
pub fn decide(
    current: Option<(DbId, Timestamp)>,
    caller: DbId,
    ttl_mins: i64,
    now: Timestamp,
) -> LockDecision {
    match current {
        None => LockDecision::Take,
        Some((_, lease_at)) if is_expired(lease_at, ttl_mins, now) => LockDecision::Take,
        Some((holder, _)) if holder == caller => LockDecision::Refresh,
        Some(_) => LockDecision::Reject,
    }
}

// ---------------------------------------------------------------------------
// Externally visible lock state
// ---------------------------------------------------------------------------

/// Lock state for a note after lazy expiry has been applied.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockStatus {
    Unlocked,
    Locked {
        holder: String,
        remaining_seconds: i64,
    },
}

/// Map raw lock columns to the status reported to clients.
///
/// An over-age lock is reported as `Unlocked` regardless of whether the
/// sweeper has cleared the row.
pub fn status(
    current: Option<(String, Timestamp)>,
    ttl_mins: i64,
    now: Timestamp,
) -> LockStatus {
    match current {
        Some((holder, lease_at)) if !is_expired(lease_at, ttl_mins, now) => LockStatus::Locked {
            holder,
            remaining_seconds: remaining_seconds(lease_at, ttl_mins, now),
        },
        _ => LockStatus::Unlocked,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
