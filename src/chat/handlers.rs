//! Chat HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::users::get_user_by_id;
use crate::chat::db;
use crate::chat::types::{
    ChatMember, ChatRoom, CreateRoomRequest, MessageResponse, MessageSearchParams,
    RoomDetailResponse, RoomResponse, SendMessageRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::realtime::broadcast::RoomEvent;
use crate::server::state::AppState;

const MESSAGE_TYPES: &[&str] = &["text", "note", "file"];

async fn require_membership(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<(ChatRoom, ChatMember), ApiError> {
    let room = db::get_room(pool, room_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    let member = db::get_membership(pool, room_id, user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Not a member of this room"))?;
    Ok((room, member))
}

async fn room_response(
    pool: &PgPool,
    room: &ChatRoom,
    member: &ChatMember,
    user_id: Uuid,
) -> Result<RoomResponse, ApiError> {
    let name = if room.room_type == "direct" {
        db::direct_peer_name(pool, room.id, user_id)
            .await?
            .unwrap_or_else(|| room.name.clone())
    } else {
        room.name.clone()
    };
    let unread_count = db::unread_count(pool, room.id, user_id, member.last_read_at).await?;
    let last_message = db::last_message(pool, room.id).await?;

    Ok(RoomResponse {
        id: room.id,
        name,
        room_type: room.room_type.clone(),
        is_favorite: member.is_favorite,
        unread_count,
        last_message,
        updated_at: room.updated_at,
    })
}

pub async fn list_rooms(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let rooms = db::list_rooms_for_user(&pool, auth.user_id).await?;
    let mut responses = Vec::with_capacity(rooms.len());
    for (room, member) in &rooms {
        responses.push(room_response(&pool, room, member, auth.user_id).await?);
    }
    Ok(Json(responses))
}

/// Create a room. Direct rooms are deduplicated: asking for a conversation
/// with the same peer returns the existing room.
pub async fn create_room(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let room = match request.room_type.as_str() {
        "direct" => {
            let peer_id = request
                .user_id
                .ok_or_else(|| ApiError::bad_request("user_id is required for a direct room"))?;
            if peer_id == auth.user_id {
                return Err(ApiError::bad_request("Cannot start a chat with yourself"));
            }
            get_user_by_id(&pool, peer_id)
                .await?
                .ok_or_else(|| ApiError::not_found("User not found"))?;

            match db::find_direct_room(&pool, auth.user_id, peer_id).await? {
                Some(existing) => existing,
                None => db::create_room(&pool, auth.user_id, "direct", "", &[peer_id]).await?,
            }
        }
        "group" => {
            let name = request
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ApiError::bad_request("Group rooms require a name"))?;
            if name.len() > 200 {
                return Err(ApiError::bad_request("Room name cannot exceed 200 characters"));
            }
            db::create_room(&pool, auth.user_id, "group", name, &request.member_ids).await?
        }
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown room type '{other}'"
            )))
        }
    };

    let member = db::get_membership(&pool, room.id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::internal("Room created without membership"))?;
    tracing::info!("User {} opened room {}", auth.username, room.id);
    Ok(Json(room_response(&pool, &room, &member, auth.user_id).await?))
}

pub async fn get_room(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<RoomDetailResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let (room, member) = require_membership(&pool, room_id, auth.user_id).await?;
    let members = db::list_members(&pool, room_id).await?;
    Ok(Json(RoomDetailResponse {
        room: room_response(&pool, &room, &member, auth.user_id).await?,
        members,
    }))
}

pub async fn list_messages(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    require_membership(&pool, room_id, auth.user_id).await?;
    Ok(Json(db::list_messages(&pool, room_id).await?))
}

/// Store a message and push it to the room's live subscribers.
pub async fn send_message(
    State(app_state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let pool = app_state
        .db_pool
        .clone()
        .ok_or(ApiError::DatabaseUnavailable)?;

    let content = request.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }
    if content.len() > 5000 {
        return Err(ApiError::bad_request("Message cannot exceed 5000 characters"));
    }
    let message_type = request.message_type.as_deref().unwrap_or("text");
    if !MESSAGE_TYPES.contains(&message_type) {
        return Err(ApiError::bad_request("Unknown message type"));
    }

    require_membership(&pool, room_id, auth.user_id).await?;

    let message = db::create_message(
        &pool,
        room_id,
        auth.user_id,
        content,
        message_type,
        request.note_id,
    )
    .await?;

    let response = MessageResponse {
        id: message.id,
        room_id: message.room_id,
        sender_id: message.sender_id,
        sender_username: auth.username.clone(),
        content: message.content,
        message_type: message.message_type,
        note_id: message.note_id,
        is_edited: message.is_edited,
        created_at: message.created_at,
    };

    app_state
        .room_broadcast
        .broadcast(room_id, RoomEvent::message(serde_json::to_value(&response)?));

    Ok(Json(response))
}

/// Announce that the caller is typing, without persisting anything.
pub async fn typing(
    State(app_state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let pool = app_state
        .db_pool
        .clone()
        .ok_or(ApiError::DatabaseUnavailable)?;

    require_membership(&pool, room_id, auth.user_id).await?;
    app_state
        .room_broadcast
        .broadcast(room_id, RoomEvent::typing(auth.user_id, &auth.username));
    Ok(Json(json!({ "message": "ok" })))
}

pub async fn mark_read(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    require_membership(&pool, room_id, auth.user_id).await?;
    db::mark_read(&pool, room_id, auth.user_id).await?;
    Ok(Json(json!({ "message": "Read position updated" })))
}

pub async fn toggle_favorite(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Json<ChatMember>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let member = db::toggle_favorite(&pool, room_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    Ok(Json(member))
}

pub async fn search_messages(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<MessageSearchParams>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let term = params.q.trim();
    if term.is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(db::search_messages(&pool, auth.user_id, term).await?))
}
