//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register   -> register (public)
/// POST /login      -> login (public)
/// POST /heartbeat  -> heartbeat (requires auth)
/// GET  /session    -> session_info (requires auth)
/// POST /logout     -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/heartbeat", post(auth::heartbeat))
        .route("/session", get(auth::session_info))
        .route("/logout", post(auth::logout))
}
