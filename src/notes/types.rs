//! Note request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Note row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_encrypted: bool,
    #[serde(skip_serializing)]
    pub encryption_key_hash: Option<String>,
    #[serde(skip_serializing)]
    pub encryption_salt: Option<String>,
    pub visibility: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note as returned by the API. Encrypted content is never included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_encrypted: bool,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    /// Build a response, masking content when the note is encrypted.
    pub fn from_note(note: &Note, tags: Vec<Uuid>) -> Self {
        let content = if note.is_encrypted {
            String::new()
        } else {
            note.content.clone()
        };
        Self {
            id: note.id,
            title: note.title.clone(),
            content,
            folder_id: note.folder_id,
            template_id: note.template_id,
            tags,
            is_pinned: note.is_pinned,
            is_archived: note.is_archived,
            is_encrypted: note.is_encrypted,
            visibility: note.visibility.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub visibility: Option<String>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub visibility: Option<String>,
    pub tags: Option<Vec<Uuid>>,
}

/// Query parameters for listing notes.
#[derive(Debug, Default, Deserialize)]
pub struct NoteListParams {
    pub folder_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub search: Option<String>,
    /// When true, list archived notes instead of active ones.
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateFromTemplateRequest {
    pub template_id: Uuid,
    pub title: Option<String>,
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct NotePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecryptedNoteResponse {
    pub id: Uuid,
    pub content: String,
}
