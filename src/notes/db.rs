//! Note database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::notes::types::{Note, NoteListParams};

const NOTE_COLUMNS: &str = "id, title, content, user_id, folder_id, template_id, is_pinned, \
     is_archived, is_encrypted, encryption_key_hash, encryption_salt, visibility, attachment, \
     created_at, updated_at";

pub async fn create_note(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &str,
    folder_id: Option<Uuid>,
    template_id: Option<Uuid>,
    visibility: &str,
) -> Result<Note, sqlx::Error> {
    let query = format!(
        "INSERT INTO notes (id, title, content, user_id, folder_id, template_id, visibility, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
         RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(user_id)
        .bind(folder_id)
        .bind(template_id)
        .bind(visibility)
        .fetch_one(pool)
        .await
}

/// Fetch a note owned by the given user.
pub async fn get_note_for_user(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// List a user's notes with optional folder, tag, and text filters.
///
/// Pinned notes sort first, then most recently updated.
pub async fn list_notes(
    pool: &PgPool,
    user_id: Uuid,
    params: &NoteListParams,
) -> Result<Vec<Note>, sqlx::Error> {
    let query = format!(
        "SELECT {NOTE_COLUMNS} FROM notes n
         WHERE n.user_id = $1
           AND n.is_archived = $2
           AND ($3::uuid IS NULL OR n.folder_id = $3)
           AND ($4::uuid IS NULL OR EXISTS (
                SELECT 1 FROM note_tags nt WHERE nt.note_id = n.id AND nt.tag_id = $4))
           AND ($5::text IS NULL OR n.title ILIKE '%' || $5 || '%'
                OR (NOT n.is_encrypted AND n.content ILIKE '%' || $5 || '%'))
         ORDER BY n.is_pinned DESC, n.updated_at DESC"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(user_id)
        .bind(params.archived)
        .bind(params.folder_id)
        .bind(params.tag_id)
        .bind(params.search.as_deref())
        .fetch_all(pool)
        .await
}

pub async fn update_note(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
    folder_id: Option<Uuid>,
    visibility: Option<&str>,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "UPDATE notes SET
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            folder_id = COALESCE($5, folder_id),
            visibility = COALESCE($6, visibility),
            updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(folder_id)
        .bind(visibility)
        .fetch_optional(pool)
        .await
}

pub async fn delete_note(pool: &PgPool, note_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(note_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_pinned(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "UPDATE notes SET is_pinned = NOT is_pinned, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn toggle_archived(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "UPDATE notes SET is_archived = NOT is_archived, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Store sealed content and mark the note encrypted.
pub async fn set_encryption(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
    ciphertext: &str,
    key_hash: &str,
    salt: &str,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "UPDATE notes SET
            content = $3,
            is_encrypted = TRUE,
            encryption_key_hash = $4,
            encryption_salt = $5,
            updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .bind(ciphertext)
        .bind(key_hash)
        .bind(salt)
        .fetch_optional(pool)
        .await
}

/// Restore plaintext content and clear encryption state.
pub async fn clear_encryption(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
    plaintext: &str,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "UPDATE notes SET
            content = $3,
            is_encrypted = FALSE,
            encryption_key_hash = NULL,
            encryption_salt = NULL,
            updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING {NOTE_COLUMNS}"
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(user_id)
        .bind(plaintext)
        .fetch_optional(pool)
        .await
}

pub async fn get_tag_ids(pool: &PgPool, note_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT tag_id FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Replace a note's tag set. Tags not owned by the user are ignored, and
/// usage counts are recomputed afterwards.
pub async fn set_tags(
    pool: &PgPool,
    note_id: Uuid,
    user_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM note_tags WHERE note_id = $1")
        .bind(note_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO note_tags (note_id, tag_id)
         SELECT $1, t.id FROM tags t WHERE t.user_id = $2 AND t.id = ANY($3)
         ON CONFLICT DO NOTHING",
    )
    .bind(note_id)
    .bind(user_id)
    .bind(tag_ids)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE tags SET usage_count = (
            SELECT COUNT(*) FROM note_tags nt WHERE nt.tag_id = tags.id)
         WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}
