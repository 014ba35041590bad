//! Folder request/response types and smart-folder rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Folder row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub color: String,
    pub folder_type: String,
    pub is_favorite: bool,
    pub smart_rules: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn is_smart(&self) -> bool {
        self.folder_type == "smart"
    }

    /// Parse stored smart rules, tolerating missing fields.
    pub fn rules(&self) -> SmartRules {
        serde_json::from_value(self.smart_rules.clone()).unwrap_or_default()
    }
}

/// Matching rules for a smart folder. A note belongs to the folder when it
/// satisfies every rule that is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartRules {
    /// Note must carry at least one of these tags.
    #[serde(default)]
    pub tags: Vec<Uuid>,
    /// Note must be created on or after this date.
    pub created_after: Option<NaiveDate>,
    /// Note must be created on or before this date.
    pub created_before: Option<NaiveDate>,
    /// Note must be instantiated from this template.
    pub template_id: Option<Uuid>,
}

/// Folder plus its (possibly rule-derived) note count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub color: String,
    pub folder_type: String,
    pub is_favorite: bool,
    pub smart_rules: serde_json::Value,
    pub note_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FolderResponse {
    pub fn from_folder(folder: &Folder, note_count: i64) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            parent_id: folder.parent_id,
            color: folder.color.clone(),
            folder_type: folder.folder_type.clone(),
            is_favorite: folder.is_favorite,
            smart_rules: folder.smart_rules.clone(),
            note_count,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

/// Folder with nested children, for the tree endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTreeNode {
    #[serde(flatten)]
    pub folder: FolderResponse,
    pub children: Vec<FolderTreeNode>,
}

/// Query parameters for listing folders.
#[derive(Debug, Default, Deserialize)]
pub struct FolderListParams {
    /// Filter by folder type ("normal" or "smart").
    #[serde(rename = "type")]
    pub folder_type: Option<String>,
    /// When true, list only favorite folders.
    #[serde(default)]
    pub favorites: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub color: Option<String>,
    pub folder_type: Option<String>,
    pub smart_rules: Option<SmartRules>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
    pub color: Option<String>,
    pub smart_rules: Option<SmartRules>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_tolerate_empty_object() {
        let folder = Folder {
            id: Uuid::new_v4(),
            name: "f".to_string(),
            user_id: Uuid::new_v4(),
            parent_id: None,
            color: "#90EE90".to_string(),
            folder_type: "smart".to_string(),
            is_favorite: false,
            smart_rules: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let rules = folder.rules();
        assert!(rules.tags.is_empty());
        assert!(rules.created_after.is_none());
        assert!(rules.template_id.is_none());
    }

    #[test]
    fn test_rules_parse_partial() {
        let tag = Uuid::new_v4();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: "f".to_string(),
            user_id: Uuid::new_v4(),
            parent_id: None,
            color: "#90EE90".to_string(),
            folder_type: "smart".to_string(),
            is_favorite: false,
            smart_rules: serde_json::json!({
                "tags": [tag],
                "created_after": "2026-01-15"
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let rules = folder.rules();
        assert_eq!(rules.tags, vec![tag]);
        assert_eq!(
            rules.created_after,
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
        assert!(rules.created_before.is_none());
    }
}
