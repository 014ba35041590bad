//! Folder HTTP handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::folders::db;
use crate::folders::types::{
    CreateFolderRequest, Folder, FolderListParams, FolderResponse, FolderTreeNode,
    UpdateFolderRequest,
};
use crate::middleware::auth::AuthUser;
use crate::notes::types::NoteResponse;
use crate::notes;

const DEFAULT_COLOR: &str = "#90EE90";

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Folder name cannot be empty"));
    }
    if name.len() > 200 {
        return Err(ApiError::bad_request(
            "Folder name cannot exceed 200 characters",
        ));
    }
    Ok(())
}

async fn folder_note_count(pool: &PgPool, folder: &Folder) -> Result<i64, ApiError> {
    let count = if folder.is_smart() {
        db::count_smart_notes(pool, folder.user_id, &folder.rules()).await?
    } else {
        db::count_folder_notes(pool, folder.id, folder.user_id).await?
    };
    Ok(count)
}

pub async fn list_folders(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<FolderListParams>,
) -> ApiResult<Json<Vec<FolderResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let folders = db::list_folders(&pool, auth.user_id, &params).await?;
    let mut responses = Vec::with_capacity(folders.len());
    for folder in &folders {
        let count = folder_note_count(&pool, folder).await?;
        responses.push(FolderResponse::from_folder(folder, count));
    }
    Ok(Json(responses))
}

pub async fn get_folder(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<FolderResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let folder = db::get_folder_for_user(&pool, folder_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;
    let count = folder_note_count(&pool, &folder).await?;
    Ok(Json(FolderResponse::from_folder(&folder, count)))
}

pub async fn create_folder(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateFolderRequest>,
) -> ApiResult<Json<FolderResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let name = request.name.trim();
    validate_name(name)?;

    let folder_type = request.folder_type.as_deref().unwrap_or("normal");
    if folder_type != "normal" && folder_type != "smart" {
        return Err(ApiError::bad_request(
            "Folder type must be 'normal' or 'smart'",
        ));
    }

    if let Some(parent_id) = request.parent_id {
        db::get_folder_for_user(&pool, parent_id, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Parent folder not found"))?;
    }

    if db::name_taken(&pool, auth.user_id, name, request.parent_id, None).await? {
        return Err(ApiError::bad_request(
            "A folder with this name already exists here",
        ));
    }

    let smart_rules = match request.smart_rules {
        Some(ref rules) => serde_json::to_value(rules)?,
        None => json!({}),
    };

    let folder = db::create_folder(
        &pool,
        auth.user_id,
        name,
        request.parent_id,
        request.color.as_deref().unwrap_or(DEFAULT_COLOR),
        folder_type,
        &smart_rules,
    )
    .await?;

    tracing::info!("User {} created folder {}", auth.username, folder.id);
    let count = folder_note_count(&pool, &folder).await?;
    Ok(Json(FolderResponse::from_folder(&folder, count)))
}

pub async fn update_folder(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(folder_id): Path<Uuid>,
    Json(request): Json<UpdateFolderRequest>,
) -> ApiResult<Json<FolderResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let existing = db::get_folder_for_user(&pool, folder_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    if let Some(ref name) = request.name {
        validate_name(name)?;
        let parent = request.parent_id.or(existing.parent_id);
        if db::name_taken(&pool, auth.user_id, name.trim(), parent, Some(folder_id)).await? {
            return Err(ApiError::bad_request(
                "A folder with this name already exists here",
            ));
        }
    }

    if let Some(parent_id) = request.parent_id {
        if parent_id == folder_id {
            return Err(ApiError::bad_request("Folder cannot be its own parent"));
        }
        db::get_folder_for_user(&pool, parent_id, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Parent folder not found"))?;
    }

    let smart_rules = match request.smart_rules {
        Some(ref rules) => Some(serde_json::to_value(rules)?),
        None => None,
    };

    let folder = db::update_folder(
        &pool,
        folder_id,
        auth.user_id,
        request.name.as_deref().map(str::trim),
        request.parent_id,
        request.color.as_deref(),
        smart_rules.as_ref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    let count = folder_note_count(&pool, &folder).await?;
    Ok(Json(FolderResponse::from_folder(&folder, count)))
}

pub async fn delete_folder(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if !db::delete_folder(&pool, folder_id, auth.user_id).await? {
        return Err(ApiError::not_found("Folder not found"));
    }
    tracing::info!("User {} deleted folder {}", auth.username, folder_id);
    Ok(Json(json!({ "message": "Folder deleted" })))
}

pub async fn toggle_favorite(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<FolderResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let folder = db::toggle_favorite(&pool, folder_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;
    let count = folder_note_count(&pool, &folder).await?;
    Ok(Json(FolderResponse::from_folder(&folder, count)))
}

/// Notes inside a folder. Smart folders resolve their rules, normal folders
/// list direct members.
pub async fn folder_notes(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(folder_id): Path<Uuid>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let folder = db::get_folder_for_user(&pool, folder_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    let notes_list = if folder.is_smart() {
        db::list_smart_notes(&pool, auth.user_id, &folder.rules()).await?
    } else {
        let params = notes::types::NoteListParams {
            folder_id: Some(folder_id),
            ..Default::default()
        };
        notes::db::list_notes(&pool, auth.user_id, &params).await?
    };

    let mut responses = Vec::with_capacity(notes_list.len());
    for note in &notes_list {
        let tags = notes::db::get_tag_ids(&pool, note.id).await?;
        responses.push(NoteResponse::from_note(note, tags));
    }
    Ok(Json(responses))
}

/// The full folder hierarchy as nested trees, roots sorted like the flat list.
pub async fn folder_tree(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<FolderTreeNode>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let folders = db::list_folders(&pool, auth.user_id, &FolderListParams::default()).await?;
    let mut responses = Vec::with_capacity(folders.len());
    for folder in &folders {
        let count = folder_note_count(&pool, folder).await?;
        responses.push(FolderResponse::from_folder(folder, count));
    }
    Ok(Json(build_tree(responses)))
}

/// Assemble nested trees from a flat folder list, preserving its order.
/// Folders whose parent is missing are treated as roots.
fn build_tree(folders: Vec<FolderResponse>) -> Vec<FolderTreeNode> {
    let ids: Vec<Uuid> = folders.iter().map(|f| f.id).collect();
    let mut children_of: HashMap<Option<Uuid>, Vec<FolderResponse>> = HashMap::new();
    for folder in folders {
        let parent = folder.parent_id.filter(|p| ids.contains(p));
        children_of.entry(parent).or_default().push(folder);
    }
    attach_children(None, &mut children_of)
}

fn attach_children(
    parent: Option<Uuid>,
    children_of: &mut HashMap<Option<Uuid>, Vec<FolderResponse>>,
) -> Vec<FolderTreeNode> {
    let Some(folders) = children_of.remove(&parent) else {
        return Vec::new();
    };
    folders
        .into_iter()
        .map(|folder| {
            let children = attach_children(Some(folder.id), children_of);
            FolderTreeNode { folder, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn response(id: Uuid, name: &str, parent_id: Option<Uuid>) -> FolderResponse {
        FolderResponse {
            id,
            name: name.to_string(),
            parent_id,
            color: DEFAULT_COLOR.to_string(),
            folder_type: "normal".to_string(),
            is_favorite: false,
            smart_rules: json!({}),
            note_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_nests_children() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let tree = build_tree(vec![
            response(root, "root", None),
            response(child, "child", Some(root)),
            response(grandchild, "grandchild", Some(child)),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].folder.id, grandchild);
    }

    #[test]
    fn test_build_tree_orphans_become_roots() {
        let missing_parent = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let tree = build_tree(vec![response(orphan, "orphan", Some(missing_parent))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].folder.id, orphan);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
        assert!(validate_name("Projects").is_ok());
    }
}
