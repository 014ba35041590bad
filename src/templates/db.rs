//! Template database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::templates::types::NoteTemplate;

const TEMPLATE_COLUMNS: &str = "id, name, category, description, icon_svg, content, \
     template_data, is_default, is_premium, price, creator_id, purchases_count, rating, \
     created_at";

/// Catalog listing, optionally narrowed to one category. Defaults first,
/// then by popularity.
pub async fn list_templates(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<NoteTemplate>, sqlx::Error> {
    let query = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM note_templates
         WHERE ($1::text IS NULL OR category = $1)
         ORDER BY is_default DESC, purchases_count DESC, name ASC"
    );
    sqlx::query_as::<_, NoteTemplate>(&query)
        .bind(category)
        .fetch_all(pool)
        .await
}

pub async fn get_template(
    pool: &PgPool,
    template_id: Uuid,
) -> Result<Option<NoteTemplate>, sqlx::Error> {
    let query = format!("SELECT {TEMPLATE_COLUMNS} FROM note_templates WHERE id = $1");
    sqlx::query_as::<_, NoteTemplate>(&query)
        .bind(template_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT category FROM note_templates WHERE category <> '' ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

/// Whether the user has bought the marketplace item backing this template.
pub async fn has_purchased(
    pool: &PgPool,
    user_id: Uuid,
    template_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT p.id FROM purchases p
         JOIN marketplace_items mi ON mi.id = p.item_id
         WHERE p.user_id = $1 AND mi.template_id = $2",
    )
    .bind(user_id)
    .bind(template_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}
