//! Repository for the `sessions` table.
//!
//! Renewal is a single conditional UPDATE so two concurrent renewals can
//! never compute inconsistent expiries: the row either matches the liveness
//! predicate and is re-stamped, or the statement touches nothing.

use sqlx::PgPool;

use scribepad_core::types::DbId;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, created_at, last_activity, expires_at";

/// Provides lifecycle operations for session leases.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new lease, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Atomically renew a live lease: bump `last_activity` and slide
    /// `expires_at` forward by the TTL.
    ///
    /// Returns `None` when no live lease matches the token hash -- either no
    /// such session exists or its lease has already lapsed.
    pub async fn touch(
        pool: &PgPool,
        token_hash: &str,
        ttl_mins: i64,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions
             SET last_activity = NOW(),
                 expires_at = NOW() + ($2 || ' minutes')::interval
             WHERE token_hash = $1
               AND expires_at > NOW()
               AND last_activity > NOW() - ($2 || ' minutes')::interval
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .bind(ttl_mins.to_string())
            .fetch_optional(pool)
            .await
    }

    /// Delete the row for this token if it exists but its lease has lapsed.
    ///
    /// Returns `true` when an expired row was removed, which lets the caller
    /// distinguish "session expired" from "no such session".
    pub async fn delete_if_expired(
        pool: &PgPool,
        token_hash: &str,
        ttl_mins: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions
             WHERE token_hash = $1
               AND (expires_at <= NOW()
                    OR last_activity <= NOW() - ($2 || ' minutes')::interval)",
        )
        .bind(token_hash)
        .bind(ttl_mins.to_string())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a session by id (no renewal side effect).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a lease by id. Revoking a nonexistent session is not an error.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every lease that is past its expiry or activity-stale.
    /// Returns the count of deleted rows. Used by the reconciliation sweeper.
    pub async fn delete_expired(pool: &PgPool, ttl_mins: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions
             WHERE expires_at <= NOW()
                OR last_activity <= NOW() - ($1 || ' minutes')::interval",
        )
        .bind(ttl_mins.to_string())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
