//! Template HTTP handlers. The catalog is read-only; premium templates enter
//! a user's library through marketplace purchases.

use axum::extract::{Path, Query, State};
use axum::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::templates::db;
use crate::templates::types::{NoteTemplate, TemplateListParams};

pub async fn list_templates(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
    Query(params): Query<TemplateListParams>,
) -> ApiResult<Json<Vec<NoteTemplate>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(
        db::list_templates(&pool, params.category.as_deref()).await?,
    ))
}

pub async fn get_template(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
    Path(template_id): Path<Uuid>,
) -> ApiResult<Json<NoteTemplate>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    let template = db::get_template(&pool, template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;
    Ok(Json(template))
}

pub async fn list_categories(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
) -> ApiResult<Json<Vec<String>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::list_categories(&pool).await?))
}
