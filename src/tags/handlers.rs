//! Tag HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::tags::db;
use crate::tags::types::{
    AutocompleteParams, CreateTagRequest, Tag, TagCloudEntry, TagListParams, TagStatistics,
    UpdateTagRequest,
};

const DEFAULT_COLOR: &str = "#FFD700";
const CLOUD_MIN_SIZE: i32 = 12;
const CLOUD_MAX_SIZE: i32 = 100;

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Tag name cannot be empty"));
    }
    if name.len() > 50 {
        return Err(ApiError::bad_request("Tag name cannot exceed 50 characters"));
    }
    Ok(())
}

/// Scale a usage count into the cloud's font-size range.
fn cloud_size(usage_count: i32, max_usage: i32) -> i32 {
    if max_usage <= 0 || usage_count <= 0 {
        return CLOUD_MIN_SIZE;
    }
    CLOUD_MIN_SIZE + (CLOUD_MAX_SIZE - CLOUD_MIN_SIZE) * usage_count / max_usage
}

pub async fn list_tags(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<TagListParams>,
) -> ApiResult<Json<Vec<Tag>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::list_tags(&pool, auth.user_id, &params).await?))
}

pub async fn create_tag(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateTagRequest>,
) -> ApiResult<Json<Tag>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let name = request.name.trim();
    validate_name(name)?;

    if db::get_tag_by_name(&pool, auth.user_id, name).await?.is_some() {
        return Err(ApiError::bad_request("A tag with this name already exists"));
    }

    let tag = db::create_tag(
        &pool,
        auth.user_id,
        name,
        request.color.as_deref().unwrap_or(DEFAULT_COLOR),
    )
    .await?;
    tracing::info!("User {} created tag '{}'", auth.username, tag.name);
    Ok(Json(tag))
}

pub async fn update_tag(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<UpdateTagRequest>,
) -> ApiResult<Json<Tag>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if let Some(ref name) = request.name {
        validate_name(name)?;
        if let Some(existing) = db::get_tag_by_name(&pool, auth.user_id, name.trim()).await? {
            if existing.id != tag_id {
                return Err(ApiError::bad_request("A tag with this name already exists"));
            }
        }
    }

    let tag = db::update_tag(
        &pool,
        tag_id,
        auth.user_id,
        request.name.as_deref().map(str::trim),
        request.color.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Tag not found"))?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(tag_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if !db::delete_tag(&pool, tag_id, auth.user_id).await? {
        return Err(ApiError::not_found("Tag not found"));
    }
    Ok(Json(json!({ "message": "Tag deleted" })))
}

/// Tag cloud with relative display sizes.
pub async fn tag_cloud(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<TagCloudEntry>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let tags = db::list_tags(&pool, auth.user_id, &TagListParams::default()).await?;
    let max_usage = tags.iter().map(|t| t.usage_count).max().unwrap_or(0);

    let entries = tags
        .into_iter()
        .map(|tag| TagCloudEntry {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            usage_count: tag.usage_count,
            size: cloud_size(tag.usage_count, max_usage),
        })
        .collect();
    Ok(Json(entries))
}

pub async fn autocomplete(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Json<Vec<Tag>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let prefix = params.q.trim();
    if prefix.is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(db::autocomplete(&pool, auth.user_id, prefix).await?))
}

pub async fn tag_statistics(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<TagStatistics>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let (total_tags, total_usages, unused_tags) = db::count_tags(&pool, auth.user_id).await?;
    let most_used = db::most_used_tag(&pool, auth.user_id).await?;

    Ok(Json(TagStatistics {
        total_tags,
        total_usages,
        unused_tags,
        most_used,
    }))
}
