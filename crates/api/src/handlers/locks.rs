//! Handlers for per-note exclusive locks: acquire/renew, release, status.
//!
//! Authorization (who may even attempt a lock) lives here; the atomic
//! read-decide-write itself is the repository's job.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use scribepad_core::error::CoreError;
use scribepad_core::leases::{self, LockStatus};
use scribepad_core::types::{DbId, Timestamp};
use scribepad_db::models::lock::{LockAttempt, LockRelease};
use scribepad_db::repositories::LockRepo;
use scribepad_events::NoteEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::notes::authorize_modify;
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a successful acquire or renew.
#[derive(Debug, Serialize)]
pub struct LockGranted {
    /// `"acquired"` for a fresh lock (including a steal), `"renewed"` when
    /// the caller already held it.
    pub state: &'static str,
    pub note_id: DbId,
    pub ttl_seconds: i64,
    /// Lease stamp the TTL counts from.
    pub lease_at: Timestamp,
}

/// POST /api/v1/notes/{id}/lock
///
/// Acquire or renew the exclusive lock on a note. Returns 423 with the
/// holder's name while another editor's lock is live.
pub async fn acquire_lock(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LockGranted>>> {
    authorize_modify(&state, &auth, id).await?;

    let ttl_mins = state.config.lock_ttl_mins;
    let attempt = LockRepo::acquire(&state.pool, id, auth.user_id, ttl_mins).await?;

    let (state_name, lock) = match attempt {
        LockAttempt::Acquired(lock) => {
            state
                .event_bus
                .publish(NoteEvent::lock_acquired(id, &lock.holder_name, ttl_mins * 60));
            tracing::info!(note_id = id, user_id = auth.user_id, "Lock acquired");
            ("acquired", lock)
        }
        LockAttempt::Renewed(lock) => {
            state
                .event_bus
                .publish(NoteEvent::lock_renewed(id, &lock.holder_name, ttl_mins * 60));
            tracing::debug!(note_id = id, user_id = auth.user_id, "Lock renewed");
            ("renewed", lock)
        }
        LockAttempt::Conflict(lock) => {
            return Err(AppError::Core(CoreError::LockConflict {
                holder: lock.holder_name,
            }));
        }
        LockAttempt::NoteMissing => {
            return Err(AppError::Core(CoreError::NotFound { entity: "note", id }));
        }
    };

    Ok(Json(DataResponse {
        data: LockGranted {
            state: state_name,
            note_id: id,
            ttl_seconds: ttl_mins * 60,
            lease_at: lock.lease_at,
        },
    }))
}

/// DELETE /api/v1/notes/{id}/lock
///
/// Release the caller's lock. Only the recorded holder may release; the
/// release still succeeds when the lease has already lazily expired.
pub async fn release_lock(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    match LockRepo::release(&state.pool, id, auth.user_id).await? {
        LockRelease::Released => {
            state.event_bus.publish(NoteEvent::lock_released(id));
            tracing::info!(note_id = id, user_id = auth.user_id, "Lock released");
            Ok(Json(DataResponse {
                data: serde_json::json!({ "released": true }),
            }))
        }
        LockRelease::NotHolder => Err(AppError::Core(CoreError::NotHolder)),
        LockRelease::NoteMissing => {
            Err(AppError::Core(CoreError::NotFound { entity: "note", id }))
        }
    }
}

/// GET /api/v1/notes/{id}/lock
///
/// Report the note's lock state with lazy expiry applied: a lock past its
/// TTL reads as unlocked even before the sweeper clears the row.
pub async fn lock_status(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LockStatus>>> {
    let recorded = LockRepo::current(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "note", id }))?;

    let status = leases::status(
        recorded.map(|lock| (lock.holder_name, lock.lease_at)),
        state.config.lock_ttl_mins,
        Utc::now(),
    );
    Ok(Json(DataResponse { data: status }))
}
