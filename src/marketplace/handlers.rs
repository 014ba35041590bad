//! Marketplace HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::marketplace::db::{self, PurchaseOutcome};
use crate::marketplace::types::{
    BrowseParams, ItemResponse, MarketplaceItem, Purchase, PurchaseResponse, UploadItemRequest,
};
use crate::middleware::auth::AuthUser;

const ITEM_TYPES: &[&str] = &["template", "theme", "sticker_pack"];
const MAX_PRICE: i32 = 10_000;

async fn item_response(
    pool: &PgPool,
    item: MarketplaceItem,
    viewer_id: Uuid,
) -> Result<ItemResponse, ApiError> {
    let creator_username = db::creator_username(pool, &item).await?;
    let owned = item.creator_id == viewer_id || db::owns_item(pool, viewer_id, item.id).await?;
    Ok(ItemResponse {
        item,
        creator_username,
        owned,
    })
}

pub async fn browse(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<BrowseParams>,
) -> ApiResult<Json<Vec<ItemResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if let Some(ref item_type) = params.item_type {
        if !ITEM_TYPES.contains(&item_type.as_str()) {
            return Err(ApiError::bad_request("Unknown item type"));
        }
    }

    let items = db::browse_items(&pool, params.item_type.as_deref()).await?;
    let mut responses = Vec::with_capacity(items.len());
    for item in items {
        responses.push(item_response(&pool, item, auth.user_id).await?);
    }
    Ok(Json(responses))
}

pub async fn get_item(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<ItemResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let item = db::get_item(&pool, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(item_response(&pool, item, auth.user_id).await?))
}

/// List an item for sale. Upload is metadata-only; template items carry
/// their content inline.
pub async fn upload_item(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<UploadItemRequest>,
) -> ApiResult<Json<ItemResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Item name cannot be empty"));
    }
    if name.len() > 200 {
        return Err(ApiError::bad_request("Item name cannot exceed 200 characters"));
    }
    if !ITEM_TYPES.contains(&request.item_type.as_str()) {
        return Err(ApiError::bad_request("Unknown item type"));
    }
    if request.price < 0 || request.price > MAX_PRICE {
        return Err(ApiError::bad_request(format!(
            "Price must be between 0 and {MAX_PRICE}"
        )));
    }
    if request.item_type == "template"
        && request.content.as_deref().map(str::trim).unwrap_or("").is_empty()
    {
        return Err(ApiError::bad_request("Template items require content"));
    }

    let item = db::create_item(
        &pool,
        auth.user_id,
        name,
        &request.item_type,
        request.price,
        &request.description,
        request.preview_image.as_deref(),
        request.content.as_deref(),
    )
    .await?;

    tracing::info!("User {} listed item {} for {} coins", auth.username, item.id, item.price);
    Ok(Json(item_response(&pool, item, auth.user_id).await?))
}

pub async fn purchase(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<PurchaseResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let item = db::get_item(&pool, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    if item.creator_id == auth.user_id {
        return Err(ApiError::bad_request("Cannot purchase your own item"));
    }

    match db::purchase_item(&pool, auth.user_id, &item).await? {
        PurchaseOutcome::Completed(purchase, currency) => {
            tracing::info!("User {} purchased item {}", auth.username, item.id);
            Ok(Json(PurchaseResponse {
                purchase,
                balance: currency.balance,
            }))
        }
        PurchaseOutcome::AlreadyOwned => Err(ApiError::bad_request("Item already purchased")),
        PurchaseOutcome::InsufficientFunds => {
            Err(ApiError::bad_request("Insufficient coin balance"))
        }
    }
}

pub async fn my_purchases(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<Purchase>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::list_purchases(&pool, auth.user_id).await?))
}
