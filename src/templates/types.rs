//! Template types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteTemplate {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub icon_svg: String,
    pub content: String,
    pub template_data: serde_json::Value,
    pub is_default: bool,
    pub is_premium: bool,
    pub price: i32,
    pub creator_id: Option<Uuid>,
    pub purchases_count: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateListParams {
    pub category: Option<String>,
}
