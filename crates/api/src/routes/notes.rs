//! Route definitions for the `/notes` resource and its lock sub-resource.
//!
//! All endpoints require authentication via the `AuthSession` extractor.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{locks, notes};
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// GET    /            -> list_notes
/// POST   /            -> create_note
/// GET    /{id}        -> get_note
/// PUT    /{id}        -> update_note (requires caller's live lock)
/// DELETE /{id}        -> delete_note
/// POST   /{id}/lock   -> acquire_lock (acquire or renew)
/// DELETE /{id}/lock   -> release_lock
/// GET    /{id}/lock   -> lock_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notes))
        .route("/", post(notes::create_note))
        .route("/{id}", get(notes::get_note))
        .route("/{id}", put(notes::update_note))
        .route("/{id}", delete(notes::delete_note))
        .route("/{id}/lock", post(locks::acquire_lock))
        .route("/{id}/lock", delete(locks::release_lock))
        .route("/{id}/lock", get(locks::lock_status))
}
