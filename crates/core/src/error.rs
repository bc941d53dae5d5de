use crate::types::DbId;

/// Domain-level error taxonomy shared by every crate in the workspace.
///
/// The API layer maps each variant to an HTTP status; repositories and
/// services return these so that callers never have to parse message strings.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller presented a session lease whose TTL has elapsed.
    #[error("Session expired")]
    SessionExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Another holder currently has a live exclusive lock.
    #[error("Locked by {holder}")]
    LockConflict { holder: String },

    /// The caller is not the holder recorded for the lock it tried to act on.
    #[error("Caller does not hold the lock")]
    NotHolder,

    #[error("Internal error: {0}")]
    Internal(String),
}
