//! Tag request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub color: String,
    pub usage_count: i32,
    pub is_auto: bool,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing tags.
#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    /// Substring filter on the tag name.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Tag with a display size for the cloud view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCloudEntry {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub usage_count: i32,
    /// Font size in points, scaled between 12 and 100 by relative usage.
    pub size: i32,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagStatistics {
    pub total_tags: i64,
    pub total_usages: i64,
    pub unused_tags: i64,
    pub most_used: Option<Tag>,
}
