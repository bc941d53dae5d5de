//! Repository for the per-note exclusive lock.
//!
//! The lock lives as columns on the note row (`locked_by`,
//! `lock_acquired_at`, `lock_lease_at`) but is only read or written here.
//! Acquire and release run as one transaction around a
//! `SELECT ... FOR UPDATE` read: two server processes racing on the same
//! note serialize on the row, so both can never observe it unlocked and both
//! believe they hold the lock.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use scribepad_core::leases::{self, LockDecision};
use scribepad_core::types::{DbId, Timestamp};

use crate::models::lock::{LockAttempt, LockRelease, NoteLock};

/// Lock columns with the holder's username resolved.
const LOCK_COLUMNS: &str = "n.id AS note_id, n.locked_by AS holder_id, \
                             u.username AS holder_name, \
                             n.lock_acquired_at AS acquired_at, \
                             n.lock_lease_at AS lease_at";

/// SET clause that clears every lock column at once.
const CLEAR_LOCK: &str = "locked_by = NULL, lock_acquired_at = NULL, lock_lease_at = NULL";

/// Provides lifecycle operations for note locks.
pub struct LockRepo;

impl LockRepo {
    /// Attempt to take, renew, or steal the lock on a note.
    ///
    /// Reads the lock columns under row exclusivity, applies the pure
    /// [`leases::decide`] rule, then performs the matching conditional write
    /// before committing. The whole read-decide-write sequence is indivisible
    /// across processes.
    pub async fn acquire(
        pool: &PgPool,
        note_id: DbId,
        holder_id: DbId,
        ttl_mins: i64,
    ) -> Result<LockAttempt, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(Option<DbId>, Option<Timestamp>)> =
            sqlx::query_as("SELECT locked_by, lock_lease_at FROM notes WHERE id = $1 FOR UPDATE")
                .bind(note_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((locked_by, lease_at)) = row else {
            return Ok(LockAttempt::NoteMissing);
        };

        let current = locked_by.zip(lease_at);
        let attempt = match leases::decide(current, holder_id, ttl_mins, Utc::now()) {
            LockDecision::Take => {
                sqlx::query(
                    "UPDATE notes
                     SET locked_by = $2, lock_acquired_at = NOW(), lock_lease_at = NOW()
                     WHERE id = $1",
                )
                .bind(note_id)
                .bind(holder_id)
                .execute(&mut *tx)
                .await?;
                LockAttempt::Acquired(Self::fetch_in_tx(&mut tx, note_id).await?)
            }
            LockDecision::Refresh => {
                sqlx::query("UPDATE notes SET lock_lease_at = NOW() WHERE id = $1")
                    .bind(note_id)
                    .execute(&mut *tx)
                    .await?;
                LockAttempt::Renewed(Self::fetch_in_tx(&mut tx, note_id).await?)
            }
            LockDecision::Reject => {
                // No write; report the live holder back to the caller.
                LockAttempt::Conflict(Self::fetch_in_tx(&mut tx, note_id).await?)
            }
        };

        tx.commit().await?;
        Ok(attempt)
    }

    /// Clear the lock on a note. Only the recorded holder may release.
    ///
    /// Succeeds even when the holder's lease has already lazily expired, as
    /// long as the store still names the caller as the last holder.
    pub async fn release(
        pool: &PgPool,
        note_id: DbId,
        holder_id: DbId,
    ) -> Result<LockRelease, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(Option<DbId>,)> =
            sqlx::query_as("SELECT locked_by FROM notes WHERE id = $1 FOR UPDATE")
                .bind(note_id)
                .fetch_optional(&mut *tx)
                .await?;

        let release = match row {
            None => LockRelease::NoteMissing,
            Some((Some(recorded),)) if recorded == holder_id => {
                let query = format!("UPDATE notes SET {CLEAR_LOCK} WHERE id = $1");
                sqlx::query(&query).bind(note_id).execute(&mut *tx).await?;
                LockRelease::Released
            }
            Some(_) => LockRelease::NotHolder,
        };

        tx.commit().await?;
        Ok(release)
    }

    /// Read the currently recorded lock for a note, without expiry applied.
    ///
    /// Outer `None` means the note does not exist; inner `None` means no lock
    /// is recorded. Callers apply [`leases::status`] for the lazily-expired
    /// view.
    pub async fn current(
        pool: &PgPool,
        note_id: DbId,
    ) -> Result<Option<Option<NoteLock>>, sqlx::Error> {
        let row: Option<(Option<DbId>, Option<String>, Option<Timestamp>, Option<Timestamp>)> =
            sqlx::query_as(
                "SELECT n.locked_by, u.username, n.lock_acquired_at, n.lock_lease_at
                 FROM notes n
                 LEFT JOIN users u ON n.locked_by = u.id
                 WHERE n.id = $1",
            )
            .bind(note_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|columns| match columns {
            (Some(holder_id), Some(holder_name), Some(acquired_at), Some(lease_at)) => {
                Some(NoteLock {
                    note_id,
                    holder_id,
                    holder_name,
                    acquired_at,
                    lease_at,
                })
            }
            _ => None,
        }))
    }

    /// Clear every lock held by a user. Returns the released note ids.
    /// Used on logout.
    pub async fn release_all_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!("UPDATE notes SET {CLEAR_LOCK} WHERE locked_by = $1 RETURNING id");
        sqlx::query_scalar(&query).bind(user_id).fetch_all(pool).await
    }

    /// Sweep step: clear every lock whose holder has no live session left.
    /// Returns the released note ids.
    pub async fn release_for_dead_holders(
        pool: &PgPool,
        session_ttl_mins: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET {CLEAR_LOCK}
             WHERE locked_by IS NOT NULL
               AND locked_by NOT IN (
                   SELECT user_id FROM sessions
                   WHERE expires_at > NOW()
                     AND last_activity > NOW() - ($1 || ' minutes')::interval)
             RETURNING id"
        );
        sqlx::query_scalar(&query)
            .bind(session_ttl_mins.to_string())
            .fetch_all(pool)
            .await
    }

    /// Sweep step: clear every lock whose own lease has aged out, regardless
    /// of the holder's session. Returns the released note ids.
    pub async fn release_expired(
        pool: &PgPool,
        lock_ttl_mins: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET {CLEAR_LOCK}
             WHERE locked_by IS NOT NULL
               AND lock_lease_at <= NOW() - ($1 || ' minutes')::interval
             RETURNING id"
        );
        sqlx::query_scalar(&query)
            .bind(lock_ttl_mins.to_string())
            .fetch_all(pool)
            .await
    }

    /// Fetch the lock with its holder's name inside an open transaction.
    ///
    /// Only called when a holder is known to be recorded.
    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        note_id: DbId,
    ) -> Result<NoteLock, sqlx::Error> {
        let query = format!(
            "SELECT {LOCK_COLUMNS}
             FROM notes n
             JOIN users u ON n.locked_by = u.id
             WHERE n.id = $1"
        );
        sqlx::query_as::<_, NoteLock>(&query)
            .bind(note_id)
            .fetch_one(&mut **tx)
            .await
    }
}
