//! Tag database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::tags::types::{Tag, TagListParams};

const TAG_COLUMNS: &str = "id, name, user_id, color, usage_count, is_auto, created_at";

pub async fn create_tag(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    color: &str,
) -> Result<Tag, sqlx::Error> {
    let query = format!(
        "INSERT INTO tags (id, name, user_id, color, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         RETURNING {TAG_COLUMNS}"
    );
    sqlx::query_as::<_, Tag>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(user_id)
        .bind(color)
        .fetch_one(pool)
        .await
}

pub async fn get_tag_for_user(
    pool: &PgPool,
    tag_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Tag>, sqlx::Error> {
    let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1 AND user_id = $2");
    sqlx::query_as::<_, Tag>(&query)
        .bind(tag_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_tag_by_name(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<Option<Tag>, sqlx::Error> {
    let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 AND LOWER(name) = LOWER($2)");
    sqlx::query_as::<_, Tag>(&query)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// A user's tags, most used first, optionally filtered by name substring.
pub async fn list_tags(
    pool: &PgPool,
    user_id: Uuid,
    params: &TagListParams,
) -> Result<Vec<Tag>, sqlx::Error> {
    let query = format!(
        "SELECT {TAG_COLUMNS} FROM tags
         WHERE user_id = $1
           AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
         ORDER BY usage_count DESC, name ASC"
    );
    sqlx::query_as::<_, Tag>(&query)
        .bind(user_id)
        .bind(params.search.as_deref())
        .fetch_all(pool)
        .await
}

pub async fn update_tag(
    pool: &PgPool,
    tag_id: Uuid,
    user_id: Uuid,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Option<Tag>, sqlx::Error> {
    let query = format!(
        "UPDATE tags SET name = COALESCE($3, name), color = COALESCE($4, color)
         WHERE id = $1 AND user_id = $2
         RETURNING {TAG_COLUMNS}"
    );
    sqlx::query_as::<_, Tag>(&query)
        .bind(tag_id)
        .bind(user_id)
        .bind(name)
        .bind(color)
        .fetch_optional(pool)
        .await
}

pub async fn delete_tag(pool: &PgPool, tag_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
        .bind(tag_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Prefix matches for autocomplete, most used first, capped at 10.
pub async fn autocomplete(
    pool: &PgPool,
    user_id: Uuid,
    prefix: &str,
) -> Result<Vec<Tag>, sqlx::Error> {
    let query = format!(
        "SELECT {TAG_COLUMNS} FROM tags
         WHERE user_id = $1 AND name ILIKE $2 || '%'
         ORDER BY usage_count DESC, name ASC
         LIMIT 10"
    );
    sqlx::query_as::<_, Tag>(&query)
        .bind(user_id)
        .bind(prefix)
        .fetch_all(pool)
        .await
}

pub async fn count_tags(pool: &PgPool, user_id: Uuid) -> Result<(i64, i64, i64), sqlx::Error> {
    let (total, usages, unused): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(usage_count), 0)::bigint,
                COUNT(*) FILTER (WHERE usage_count = 0)
         FROM tags WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok((total, usages, unused))
}

pub async fn most_used_tag(pool: &PgPool, user_id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
    let query = format!(
        "SELECT {TAG_COLUMNS} FROM tags
         WHERE user_id = $1 AND usage_count > 0
         ORDER BY usage_count DESC, name ASC
         LIMIT 1"
    );
    sqlx::query_as::<_, Tag>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
