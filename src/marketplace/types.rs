//! Marketplace types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub name: String,
    /// "template", "theme", or "sticker_pack".
    pub item_type: String,
    pub template_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub price: i32,
    pub file: Option<String>,
    pub preview_image: Option<String>,
    pub description: String,
    pub purchases_count: i32,
    pub rating: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item with the creator's username and the viewer's ownership flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: MarketplaceItem,
    pub creator_username: String,
    pub owned: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    /// Filter by item type.
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadItemRequest {
    pub name: String,
    pub item_type: String,
    pub price: i32,
    #[serde(default)]
    pub description: String,
    pub preview_image: Option<String>,
    /// Template content for "template" items; stored in the template catalog.
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub price_paid: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub purchase: Purchase,
    pub balance: i32,
}
