//! Folder database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::folders::types::{Folder, FolderListParams, SmartRules};
use crate::notes::types::Note;

const FOLDER_COLUMNS: &str = "id, name, user_id, parent_id, color, folder_type, is_favorite, \
     smart_rules, created_at, updated_at";

#[allow(clippy::too_many_arguments)]
pub async fn create_folder(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    parent_id: Option<Uuid>,
    color: &str,
    folder_type: &str,
    smart_rules: &serde_json::Value,
) -> Result<Folder, sqlx::Error> {
    let query = format!(
        "INSERT INTO folders (id, name, user_id, parent_id, color, folder_type, smart_rules, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
         RETURNING {FOLDER_COLUMNS}"
    );
    sqlx::query_as::<_, Folder>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(user_id)
        .bind(parent_id)
        .bind(color)
        .bind(folder_type)
        .bind(smart_rules)
        .fetch_one(pool)
        .await
}

pub async fn get_folder_for_user(
    pool: &PgPool,
    folder_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Folder>, sqlx::Error> {
    let query = format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1 AND user_id = $2");
    sqlx::query_as::<_, Folder>(&query)
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// A user's folders, favorites first, then alphabetical.
pub async fn list_folders(
    pool: &PgPool,
    user_id: Uuid,
    params: &FolderListParams,
) -> Result<Vec<Folder>, sqlx::Error> {
    let query = format!(
        "SELECT {FOLDER_COLUMNS} FROM folders
         WHERE user_id = $1
           AND ($2::text IS NULL OR folder_type = $2)
           AND (NOT $3 OR is_favorite)
         ORDER BY is_favorite DESC, name ASC"
    );
    sqlx::query_as::<_, Folder>(&query)
        .bind(user_id)
        .bind(params.folder_type.as_deref())
        .bind(params.favorites)
        .fetch_all(pool)
        .await
}

/// Check whether a sibling folder with the same name already exists.
pub async fn name_taken(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    parent_id: Option<Uuid>,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM folders
         WHERE user_id = $1 AND name = $2 AND parent_id IS NOT DISTINCT FROM $3
           AND ($4::uuid IS NULL OR id <> $4)",
    )
    .bind(user_id)
    .bind(name)
    .bind(parent_id)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn update_folder(
    pool: &PgPool,
    folder_id: Uuid,
    user_id: Uuid,
    name: Option<&str>,
    parent_id: Option<Uuid>,
    color: Option<&str>,
    smart_rules: Option<&serde_json::Value>,
) -> Result<Option<Folder>, sqlx::Error> {
    let query = format!(
        "UPDATE folders SET
            name = COALESCE($3, name),
            parent_id = COALESCE($4, parent_id),
            color = COALESCE($5, color),
            smart_rules = COALESCE($6, smart_rules),
            updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {FOLDER_COLUMNS}"
    );
    sqlx::query_as::<_, Folder>(&query)
        .bind(folder_id)
        .bind(user_id)
        .bind(name)
        .bind(parent_id)
        .bind(color)
        .bind(smart_rules)
        .fetch_optional(pool)
        .await
}

pub async fn delete_folder(
    pool: &PgPool,
    folder_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
        .bind(folder_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_favorite(
    pool: &PgPool,
    folder_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Folder>, sqlx::Error> {
    let query = format!(
        "UPDATE folders SET is_favorite = NOT is_favorite, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 RETURNING {FOLDER_COLUMNS}"
    );
    sqlx::query_as::<_, Folder>(&query)
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Count active notes assigned directly to a folder.
pub async fn count_folder_notes(
    pool: &PgPool,
    folder_id: Uuid,
    user_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notes
         WHERE folder_id = $1 AND user_id = $2 AND NOT is_archived",
    )
    .bind(folder_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Count active notes matching a smart folder's rules. Unset rules match
/// everything.
pub async fn count_smart_notes(
    pool: &PgPool,
    user_id: Uuid,
    rules: &SmartRules,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notes n
         WHERE n.user_id = $1 AND NOT n.is_archived
           AND (cardinality($2::uuid[]) = 0 OR EXISTS (
                SELECT 1 FROM note_tags nt WHERE nt.note_id = n.id AND nt.tag_id = ANY($2)))
           AND ($3::date IS NULL OR n.created_at::date >= $3)
           AND ($4::date IS NULL OR n.created_at::date <= $4)
           AND ($5::uuid IS NULL OR n.template_id = $5)",
    )
    .bind(user_id)
    .bind(&rules.tags)
    .bind(rules.created_after)
    .bind(rules.created_before)
    .bind(rules.template_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Active notes matching a smart folder's rules, newest first.
pub async fn list_smart_notes(
    pool: &PgPool,
    user_id: Uuid,
    rules: &SmartRules,
) -> Result<Vec<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>(
        "SELECT id, title, content, user_id, folder_id, template_id, is_pinned, is_archived,
                is_encrypted, encryption_key_hash, encryption_salt, visibility, attachment,
                created_at, updated_at
         FROM notes n
         WHERE n.user_id = $1 AND NOT n.is_archived
           AND (cardinality($2::uuid[]) = 0 OR EXISTS (
                SELECT 1 FROM note_tags nt WHERE nt.note_id = n.id AND nt.tag_id = ANY($2)))
           AND ($3::date IS NULL OR n.created_at::date >= $3)
           AND ($4::date IS NULL OR n.created_at::date <= $4)
           AND ($5::uuid IS NULL OR n.template_id = $5)
         ORDER BY n.is_pinned DESC, n.updated_at DESC",
    )
    .bind(user_id)
    .bind(&rules.tags)
    .bind(rules.created_after)
    .bind(rules.created_before)
    .bind(rules.template_id)
    .fetch_all(pool)
    .await
}
