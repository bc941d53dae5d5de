//! Route definitions, one module per resource.

pub mod auth;
pub mod health;
pub mod notes;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                      WebSocket upgrade (token query param)
///
/// /auth/register           create account (public)
/// /auth/login              login (public)
/// /auth/heartbeat          renew session lease
/// /auth/session            current session info
/// /auth/logout             revoke session, release held locks
///
/// /notes                   list, create
/// /notes/{id}              get, update (requires lock), delete
/// /notes/{id}/lock         acquire/renew (POST), release (DELETE),
///                          status (GET, lazy expiry applied)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/notes", notes::router())
}
