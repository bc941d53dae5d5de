//! Handlers for the `/auth` resource (register, login, heartbeat, session,
//! logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use scribepad_core::error::CoreError;
use scribepad_core::roles::{self, ROLE_USER};
use scribepad_core::types::Timestamp;
use scribepad_db::models::session::CreateSession;
use scribepad_db::models::user::{CreateUser, UserResponse};
use scribepad_db::repositories::{LockRepo, SessionRepo, UserRepo};
use scribepad_events::NoteEvent;

use crate::auth::jwt::{generate_session_token, hash_session_token};
use crate::auth::password::{check_password_strength, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    /// Defaults to `"user"` when omitted.
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Expiry of the freshly issued session lease.
    pub expires_at: Timestamp,
    pub user: UserResponse,
}

/// Response body for `POST /auth/heartbeat`.
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    /// Lease expiry after this heartbeat's renewal.
    pub expires_at: Timestamp,
    pub server_time: Timestamp,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a new account. Open registration, as in small team deployments;
/// role defaults to `user`.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    check_password_strength(&input.password).map_err(CoreError::Validation)?;

    let role = input.role.unwrap_or_else(|| ROLE_USER.to_string());
    if !roles::is_valid_role(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{role}'"
        ))));
    }

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Issues a session token and opens a
/// fresh session lease.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    let token = generate_session_token(user.id, &user.username, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_at = Utc::now() + chrono::Duration::minutes(state.config.session_ttl_mins);
    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            token_hash: hash_session_token(&token),
            expires_at,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            token,
            expires_at: session.expires_at,
            user: UserResponse::from(&user),
        },
    }))
}

/// POST /api/v1/auth/heartbeat
///
/// Renew the session lease. The [`AuthSession`] extractor already performed
/// the atomic renewal; this just reports the new expiry.
pub async fn heartbeat(auth: AuthSession) -> Json<DataResponse<HeartbeatResponse>> {
    Json(DataResponse {
        data: HeartbeatResponse {
            expires_at: auth.expires_at,
            server_time: Utc::now(),
        },
    })
}

/// GET /api/v1/auth/session
///
/// Return the caller's current session lease.
pub async fn session_info(
    auth: AuthSession,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let session = SessionRepo::find_by_id(&state.pool, auth.session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "session",
            id: auth.session_id,
        }))?;

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "session": session,
            "user": {
                "id": auth.user_id,
                "username": auth.username,
                "role": auth.role,
            },
        }),
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the caller's session lease and release every lock it holds,
/// broadcasting each release. Returns 204 No Content.
pub async fn logout(auth: AuthSession, State(state): State<AppState>) -> AppResult<StatusCode> {
    SessionRepo::revoke(&state.pool, auth.session_id).await?;

    let released = LockRepo::release_all_for_user(&state.pool, auth.user_id).await?;
    for note_id in &released {
        state.event_bus.publish(NoteEvent::lock_released(*note_id));
    }

    tracing::info!(
        user_id = auth.user_id,
        released = released.len(),
        "User logged out"
    );

    Ok(StatusCode::NO_CONTENT)
}
