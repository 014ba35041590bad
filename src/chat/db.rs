//! Chat database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::chat::types::{ChatMember, ChatMessage, ChatRoom, MessageResponse, RoomMemberInfo};

const ROOM_COLUMNS: &str = "id, name, room_type, created_by, is_active, created_at, updated_at";

const MEMBER_COLUMNS: &str =
    "id, room_id, user_id, joined_at, last_read_at, is_muted, is_admin, is_favorite";

const MESSAGE_RESPONSE_QUERY: &str =
    "SELECT m.id, m.room_id, m.sender_id, u.username AS sender_username, m.content,
            m.message_type, m.note_id, m.is_edited, m.created_at
     FROM chat_messages m
     JOIN users u ON u.id = m.sender_id";

pub async fn get_room(pool: &PgPool, room_id: Uuid) -> Result<Option<ChatRoom>, sqlx::Error> {
    let query = format!("SELECT {ROOM_COLUMNS} FROM chat_rooms WHERE id = $1 AND is_active");
    sqlx::query_as::<_, ChatRoom>(&query)
        .bind(room_id)
        .fetch_optional(pool)
        .await
}

/// The caller's membership row, `None` when they are not in the room.
pub async fn get_membership(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ChatMember>, sqlx::Error> {
    let query =
        format!("SELECT {MEMBER_COLUMNS} FROM chat_members WHERE room_id = $1 AND user_id = $2");
    sqlx::query_as::<_, ChatMember>(&query)
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// An existing direct room between exactly these two users.
pub async fn find_direct_room(
    pool: &PgPool,
    user_a: Uuid,
    user_b: Uuid,
) -> Result<Option<ChatRoom>, sqlx::Error> {
    let query = format!(
        "SELECT {ROOM_COLUMNS} FROM chat_rooms r
         WHERE r.room_type = 'direct' AND r.is_active
           AND EXISTS (SELECT 1 FROM chat_members WHERE room_id = r.id AND user_id = $1)
           AND EXISTS (SELECT 1 FROM chat_members WHERE room_id = r.id AND user_id = $2)
           AND (SELECT COUNT(*) FROM chat_members WHERE room_id = r.id) = 2
         LIMIT 1"
    );
    sqlx::query_as::<_, ChatRoom>(&query)
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(pool)
        .await
}

/// Create a room and enroll its members in one transaction. The creator is
/// the room admin.
pub async fn create_room(
    pool: &PgPool,
    creator_id: Uuid,
    room_type: &str,
    name: &str,
    member_ids: &[Uuid],
) -> Result<ChatRoom, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let query = format!(
        "INSERT INTO chat_rooms (id, name, room_type, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, NOW(), NOW())
         RETURNING {ROOM_COLUMNS}"
    );
    let room = sqlx::query_as::<_, ChatRoom>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(room_type)
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO chat_members (id, room_id, user_id, joined_at, is_admin)
         VALUES ($1, $2, $3, NOW(), TRUE)",
    )
    .bind(Uuid::new_v4())
    .bind(room.id)
    .bind(creator_id)
    .execute(&mut *tx)
    .await?;

    for member_id in member_ids {
        if *member_id == creator_id {
            continue;
        }
        sqlx::query(
            "INSERT INTO chat_members (id, room_id, user_id, joined_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (room_id, user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(room.id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(room)
}

/// Rooms the user belongs to, favorites first, then most recently active.
pub async fn list_rooms_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<(ChatRoom, ChatMember)>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        room: ChatRoom,
        member_id: Uuid,
        member_joined_at: chrono::DateTime<chrono::Utc>,
        last_read_at: Option<chrono::DateTime<chrono::Utc>>,
        is_muted: bool,
        is_admin: bool,
        is_favorite: bool,
    }

    let query = format!(
        "SELECT r.id, r.name, r.room_type, r.created_by, r.is_active, r.created_at, r.updated_at,
                m.id AS member_id, m.joined_at AS member_joined_at, m.last_read_at,
                m.is_muted, m.is_admin, m.is_favorite
         FROM chat_rooms r
         JOIN chat_members m ON m.room_id = r.id
         WHERE m.user_id = $1 AND r.is_active
         ORDER BY m.is_favorite DESC, r.updated_at DESC"
    );
    let rows = sqlx::query_as::<_, Row>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let member = ChatMember {
                id: row.member_id,
                room_id: row.room.id,
                user_id,
                joined_at: row.member_joined_at,
                last_read_at: row.last_read_at,
                is_muted: row.is_muted,
                is_admin: row.is_admin,
                is_favorite: row.is_favorite,
            };
            (row.room, member)
        })
        .collect())
}

pub async fn list_members(pool: &PgPool, room_id: Uuid) -> Result<Vec<RoomMemberInfo>, sqlx::Error> {
    sqlx::query_as::<_, RoomMemberInfo>(
        "SELECT m.user_id, u.username, m.is_admin, m.joined_at
         FROM chat_members m
         JOIN users u ON u.id = m.user_id
         WHERE m.room_id = $1
         ORDER BY m.joined_at ASC",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await
}

/// Display name of the other participant in a direct room.
pub async fn direct_peer_name(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT u.username FROM chat_members m
         JOIN users u ON u.id = m.user_id
         WHERE m.room_id = $1 AND m.user_id <> $2
         LIMIT 1",
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(name,)| name))
}

/// The last 50 undeleted messages in chronological order.
pub async fn list_messages(
    pool: &PgPool,
    room_id: Uuid,
) -> Result<Vec<MessageResponse>, sqlx::Error> {
    let query = format!(
        "{MESSAGE_RESPONSE_QUERY}
         WHERE m.room_id = $1 AND NOT m.is_deleted
         ORDER BY m.created_at DESC
         LIMIT 50"
    );
    let mut messages = sqlx::query_as::<_, MessageResponse>(&query)
        .bind(room_id)
        .fetch_all(pool)
        .await?;
    messages.reverse();
    Ok(messages)
}

pub async fn last_message(
    pool: &PgPool,
    room_id: Uuid,
) -> Result<Option<MessageResponse>, sqlx::Error> {
    let query = format!(
        "{MESSAGE_RESPONSE_QUERY}
         WHERE m.room_id = $1 AND NOT m.is_deleted
         ORDER BY m.created_at DESC
         LIMIT 1"
    );
    sqlx::query_as::<_, MessageResponse>(&query)
        .bind(room_id)
        .fetch_optional(pool)
        .await
}

/// Store a message and bump the room's activity timestamp together.
pub async fn create_message(
    pool: &PgPool,
    room_id: Uuid,
    sender_id: Uuid,
    content: &str,
    message_type: &str,
    note_id: Option<Uuid>,
) -> Result<ChatMessage, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let message = sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO chat_messages (id, room_id, sender_id, content, message_type, note_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
         RETURNING id, room_id, sender_id, content, message_type, note_id, file, is_edited,
                   is_deleted, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(room_id)
    .bind(sender_id)
    .bind(content)
    .bind(message_type)
    .bind(note_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE chat_rooms SET updated_at = NOW() WHERE id = $1")
        .bind(room_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(message)
}

/// Messages from others since the member's last read mark.
pub async fn unread_count(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
    last_read_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM chat_messages
         WHERE room_id = $1 AND sender_id <> $2 AND NOT is_deleted
           AND ($3::timestamptz IS NULL OR created_at > $3)",
    )
    .bind(room_id)
    .bind(user_id)
    .bind(last_read_at)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn mark_read(pool: &PgPool, room_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE chat_members SET last_read_at = NOW() WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_favorite(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ChatMember>, sqlx::Error> {
    let query = format!(
        "UPDATE chat_members SET is_favorite = NOT is_favorite
         WHERE room_id = $1 AND user_id = $2
         RETURNING {MEMBER_COLUMNS}"
    );
    sqlx::query_as::<_, ChatMember>(&query)
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Search across all of the user's rooms, newest matches first.
pub async fn search_messages(
    pool: &PgPool,
    user_id: Uuid,
    term: &str,
) -> Result<Vec<MessageResponse>, sqlx::Error> {
    let query = format!(
        "{MESSAGE_RESPONSE_QUERY}
         JOIN chat_members cm ON cm.room_id = m.room_id AND cm.user_id = $1
         WHERE NOT m.is_deleted AND m.content ILIKE '%' || $2 || '%'
         ORDER BY m.created_at DESC
         LIMIT 50"
    );
    sqlx::query_as::<_, MessageResponse>(&query)
        .bind(user_id)
        .bind(term)
        .fetch_all(pool)
        .await
}
