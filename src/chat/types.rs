//! Chat request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRoom {
    pub id: Uuid,
    pub name: String,
    /// Either "direct" or "group".
    pub room_type: String,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMember {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub is_muted: bool,
    pub is_admin: bool,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// "text", "note", or "file".
    pub message_type: String,
    pub note_id: Option<Uuid>,
    pub file: Option<String>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Message joined with its sender's username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub content: String,
    pub message_type: String,
    pub note_id: Option<Uuid>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

/// Room as listed for a user: display name resolved for direct rooms,
/// favorite flag from their membership, and unread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: String,
    pub room_type: String,
    pub is_favorite: bool,
    pub unread_count: i64,
    pub last_message: Option<MessageResponse>,
    pub updated_at: DateTime<Utc>,
}

/// Room detail with its member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub members: Vec<RoomMemberInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomMemberInfo {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

/// Create either a direct room (peer only) or a group room (name plus
/// member list).
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default = "default_room_type")]
    pub room_type: String,
    /// Peer for a direct room.
    pub user_id: Option<Uuid>,
    /// Group room name.
    pub name: Option<String>,
    /// Additional members for a group room.
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

fn default_room_type() -> String {
    "direct".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub message_type: Option<String>,
    /// Shared note, for "note" messages.
    pub note_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MessageSearchParams {
    #[serde(default)]
    pub q: String,
}
