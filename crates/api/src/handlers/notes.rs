//! Handlers for the `/notes` resource.
//!
//! Reads are open to every authenticated role. Writes are role- and
//! ownership-guarded here, and edits additionally require the caller's live
//! lock, enforced atomically by the repository.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use scribepad_core::error::CoreError;
use scribepad_core::roles;
use scribepad_core::types::DbId;
use scribepad_db::models::note::{CreateNote, EditOutcome, Note, UpdateNote};
use scribepad_db::repositories::NoteRepo;
use scribepad_events::NoteEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notes
///
/// List all notes with owner and lock-holder names, newest update first.
pub async fn list_notes(
    _auth: AuthSession,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Note>>>> {
    let notes = NoteRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// GET /api/v1/notes/{id}
pub async fn get_note(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Note>>> {
    let note = NoteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "note", id }))?;
    Ok(Json(DataResponse { data: note }))
}

/// POST /api/v1/notes
///
/// Create a note owned by the caller. Guests may not create notes.
pub async fn create_note(
    auth: AuthSession,
    State(state): State<AppState>,
    Json(input): Json<CreateNote>,
) -> AppResult<(StatusCode, Json<DataResponse<Note>>)> {
    if !roles::can_author(&auth.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Guests cannot create notes".into(),
        )));
    }
    input.validate()?;

    let note = NoteRepo::create(&state.pool, auth.user_id, &input).await?;
    state.event_bus.publish(NoteEvent::note_created(note.id));

    tracing::info!(note_id = note.id, user_id = auth.user_id, "Note created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// PUT /api/v1/notes/{id}
///
/// Update a note's title and content. Requires ownership (or admin) and the
/// caller's live lock; an edit without a live lock is a 423.
pub async fn update_note(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNote>,
) -> AppResult<Json<DataResponse<Note>>> {
    authorize_modify(&state, &auth, id).await?;
    input.validate()?;

    let outcome =
        NoteRepo::update_locked(&state.pool, id, auth.user_id, state.config.lock_ttl_mins, &input)
            .await?;

    match outcome {
        EditOutcome::Updated(note) => {
            state.event_bus.publish(NoteEvent::note_updated(note.id));
            tracing::info!(note_id = id, user_id = auth.user_id, "Note updated");
            Ok(Json(DataResponse { data: note }))
        }
        EditOutcome::NotHolder | EditOutcome::LeaseExpired => {
            Err(AppError::Core(CoreError::NotHolder))
        }
        EditOutcome::NoteMissing => {
            Err(AppError::Core(CoreError::NotFound { entity: "note", id }))
        }
    }
}

/// DELETE /api/v1/notes/{id}
///
/// Delete a note. Admins may delete any note, users their own.
pub async fn delete_note(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_modify(&state, &auth, id).await?;

    if !NoteRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "note", id }));
    }
    state.event_bus.publish(NoteEvent::note_deleted(id));

    tracing::info!(note_id = id, user_id = auth.user_id, "Note deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Check that the caller's role and the note's ownership permit modification.
///
/// Shared by update, delete, and the lock handlers.
pub(crate) async fn authorize_modify(
    state: &AppState,
    auth: &AuthSession,
    note_id: DbId,
) -> AppResult<()> {
    let owner_id = NoteRepo::owner_id(&state.pool, note_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "note",
            id: note_id,
        }))?;

    if !roles::can_modify(&auth.role, owner_id, auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only modify your own notes".into(),
        )));
    }
    Ok(())
}
