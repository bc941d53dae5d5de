//! Session-validating authentication extractor for Axum handlers.
//!
//! Unlike a pure JWT check, every authenticated request also touches the
//! session lease in the database: a valid signature with no live lease is
//! rejected, and a live lease is atomically renewed as a side effect
//! (heartbeat-on-touch). Any authenticated call therefore extends the lease.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use scribepad_core::error::CoreError;
use scribepad_core::types::{DbId, Timestamp};
use scribepad_db::repositories::SessionRepo;

use crate::auth::jwt::{hash_session_token, validate_token};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller with a live, just-renewed session lease.
///
/// Use as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(auth: AuthSession) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, role = %auth.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's login name.
    pub username: String,
    /// The user's role name (`"admin"`, `"user"`, `"guest"`).
    pub role: String,
    /// The session lease row backing this request.
    pub session_id: DbId,
    /// Lease expiry after this request's renewal.
    pub expires_at: Timestamp,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        authenticate(state, token).await
    }
}

/// Validate a session token end to end: JWT signature, then the database
/// lease, which is renewed atomically when live.
///
/// Shared between the HTTP extractor and the WebSocket upgrade handler.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthSession, AppError> {
    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let token_hash = hash_session_token(token);
    let ttl = state.config.session_ttl_mins;

    match SessionRepo::touch(&state.pool, &token_hash, ttl).await? {
        Some(session) => Ok(AuthSession {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            session_id: session.id,
            expires_at: session.expires_at,
        }),
        None => {
            // Distinguish a lapsed lease from a revoked/unknown one, and
            // clean up the dead row while we are here.
            if SessionRepo::delete_if_expired(&state.pool, &token_hash, ttl).await? {
                Err(AppError::Core(CoreError::SessionExpired))
            } else {
                Err(AppError::Core(CoreError::Unauthorized(
                    "Session not found".into(),
                )))
            }
        }
    }
}
