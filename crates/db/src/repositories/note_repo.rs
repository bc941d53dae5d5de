//! Repository for the `notes` table.

use chrono::Utc;
use sqlx::PgPool;

use scribepad_core::leases;
use scribepad_core::types::{DbId, Timestamp};

use crate::models::note::{CreateNote, EditOutcome, Note, UpdateNote};

/// Column list with owner and locker usernames resolved.
const COLUMNS: &str = "n.id, n.title, n.content, n.owner_id, \
                        o.username AS owner_name, \
                        n.locked_by, l.username AS locked_by_name, \
                        n.lock_acquired_at, n.lock_lease_at, \
                        n.created_at, n.updated_at";

/// FROM clause matching [`COLUMNS`].
const FROM: &str = "FROM notes n \
                     JOIN users o ON n.owner_id = o.id \
                     LEFT JOIN users l ON n.locked_by = l.id";

/// Provides CRUD operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new note, returning the created row with names resolved.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateNote,
    ) -> Result<Note, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO notes (title, content, owner_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} {FROM} WHERE n.id = $1");
        sqlx::query_as::<_, Note>(&query).bind(id).fetch_one(pool).await
    }

    /// Find a note by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {FROM} WHERE n.id = $1");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all notes, most recently updated first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {FROM} ORDER BY n.updated_at DESC");
        sqlx::query_as::<_, Note>(&query).fetch_all(pool).await
    }

    /// Look up just the owner of a note, for authorization checks.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT owner_id FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a note's title and content, requiring the editor's live lock.
    ///
    /// The lock check and the write happen in one transaction under
    /// `FOR UPDATE`, so a lock stolen between check and write is impossible.
    pub async fn update_locked(
        pool: &PgPool,
        id: DbId,
        editor_id: DbId,
        lock_ttl_mins: i64,
        input: &UpdateNote,
    ) -> Result<EditOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(Option<DbId>, Option<Timestamp>)> =
            sqlx::query_as("SELECT locked_by, lock_lease_at FROM notes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((locked_by, lease_at)) = row else {
            return Ok(EditOutcome::NoteMissing);
        };

        if locked_by != Some(editor_id) {
            return Ok(EditOutcome::NotHolder);
        }
        if lease_at.map_or(true, |at| leases::is_expired(at, lock_ttl_mins, Utc::now())) {
            return Ok(EditOutcome::LeaseExpired);
        }

        sqlx::query(
            "UPDATE notes SET title = $2, content = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(&input.content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let query = format!("SELECT {COLUMNS} {FROM} WHERE n.id = $1");
        let note = sqlx::query_as::<_, Note>(&query).bind(id).fetch_one(pool).await?;
        Ok(EditOutcome::Updated(note))
    }

    /// Delete a note. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
