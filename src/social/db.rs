//! Social database operations.
//!
//! Follower counters on the user rows are recomputed from the follows table
//! after every change rather than incremented, so they can never drift.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::notes::types::Note;
use crate::social::types::{FireflyResponse, FollowEntry, UserSettings};

pub async fn is_following(
    pool: &PgPool,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM follows WHERE follower_id = $1 AND following_id = $2",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

async fn refresh_counters(
    tx: &mut Transaction<'_, Postgres>,
    user_ids: [Uuid; 2],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            followers_count = (SELECT COUNT(*) FROM follows WHERE following_id = users.id),
            following_count = (SELECT COUNT(*) FROM follows WHERE follower_id = users.id),
            updated_at = NOW()
         WHERE id = ANY($1)",
    )
    .bind(&user_ids[..])
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Follow a user. Idempotent: following twice is a no-op.
pub async fn follow(
    pool: &PgPool,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO follows (id, follower_id, following_id, created_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (follower_id, following_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(follower_id)
    .bind(following_id)
    .execute(&mut *tx)
    .await?;
    refresh_counters(&mut tx, [follower_id, following_id]).await?;
    tx.commit().await
}

/// Unfollow a user. Returns false when no follow existed.
pub async fn unfollow(
    pool: &PgPool,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *tx)
        .await?;
    refresh_counters(&mut tx, [follower_id, following_id]).await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_followers(pool: &PgPool, user_id: Uuid) -> Result<Vec<FollowEntry>, sqlx::Error> {
    sqlx::query_as::<_, FollowEntry>(
        "SELECT u.id AS user_id, u.username, u.avatar, f.created_at AS followed_at
         FROM follows f
         JOIN users u ON u.id = f.follower_id
         WHERE f.following_id = $1
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_following(pool: &PgPool, user_id: Uuid) -> Result<Vec<FollowEntry>, sqlx::Error> {
    sqlx::query_as::<_, FollowEntry>(
        "SELECT u.id AS user_id, u.username, u.avatar, f.created_at AS followed_at
         FROM follows f
         JOIN users u ON u.id = f.following_id
         WHERE f.follower_id = $1
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// A user's shareable notes, newest first, capped at 50. Followers see both
/// "public" and "followers" notes; everyone else only "public".
pub async fn list_visible_notes(
    pool: &PgPool,
    owner_id: Uuid,
    viewer_follows: bool,
) -> Result<Vec<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>(
        "SELECT id, title, content, user_id, folder_id, template_id, is_pinned, is_archived,
                is_encrypted, encryption_key_hash, encryption_salt, visibility, attachment,
                created_at, updated_at
         FROM notes
         WHERE user_id = $1 AND NOT is_archived AND NOT is_encrypted
           AND (visibility = 'public' OR ($2 AND visibility = 'followers'))
         ORDER BY created_at DESC
         LIMIT 50",
    )
    .bind(owner_id)
    .bind(viewer_follows)
    .fetch_all(pool)
    .await
}

/// Send a firefly and bump the receiver's counter together.
pub async fn send_firefly(
    pool: &PgPool,
    sender_id: Uuid,
    receiver_id: Uuid,
    note_id: Option<Uuid>,
    message: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (firefly_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO fireflies (id, sender_id, receiver_id, note_id, message, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW())
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(sender_id)
    .bind(receiver_id)
    .bind(note_id)
    .bind(message)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO user_statistics (id, user_id, fireflies_count, updated_at)
         VALUES ($1, $2, 1, NOW())
         ON CONFLICT (user_id) DO UPDATE
         SET fireflies_count = user_statistics.fireflies_count + 1, updated_at = NOW()",
    )
    .bind(Uuid::new_v4())
    .bind(receiver_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(firefly_id)
}

/// Fireflies received by a user, newest first, capped at 100.
pub async fn list_received_fireflies(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<FireflyResponse>, sqlx::Error> {
    sqlx::query_as::<_, FireflyResponse>(
        "SELECT f.id, f.sender_id, u.username AS sender_username, f.note_id, f.message,
                f.created_at
         FROM fireflies f
         JOIN users u ON u.id = f.sender_id
         WHERE f.receiver_id = $1
         ORDER BY f.created_at DESC
         LIMIT 100",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

const SETTINGS_COLUMNS: &str = "id, user_id, profile_visibility, show_email, show_statistics, \
     allow_follow_requests, default_note_visibility, auto_save_enabled, auto_save_interval, \
     email_notifications, push_notifications, notify_on_follow, notify_on_message, created_at, \
     updated_at";

/// Fetch settings, creating defaults on first access.
pub async fn get_settings(pool: &PgPool, user_id: Uuid) -> Result<UserSettings, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO user_settings (id, user_id, created_at, updated_at)
         VALUES ($1, $2, NOW(), NOW())
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let query = format!("SELECT {SETTINGS_COLUMNS} FROM user_settings WHERE user_id = $1");
    let settings = sqlx::query_as::<_, UserSettings>(&query)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(settings)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_settings(
    pool: &PgPool,
    user_id: Uuid,
    update: &crate::social::types::UpdateSettingsRequest,
) -> Result<UserSettings, sqlx::Error> {
    // Row is guaranteed to exist after get_settings.
    get_settings(pool, user_id).await?;

    let query = format!(
        "UPDATE user_settings SET
            profile_visibility = COALESCE($2, profile_visibility),
            show_email = COALESCE($3, show_email),
            show_statistics = COALESCE($4, show_statistics),
            allow_follow_requests = COALESCE($5, allow_follow_requests),
            default_note_visibility = COALESCE($6, default_note_visibility),
            auto_save_enabled = COALESCE($7, auto_save_enabled),
            auto_save_interval = COALESCE($8, auto_save_interval),
            email_notifications = COALESCE($9, email_notifications),
            push_notifications = COALESCE($10, push_notifications),
            notify_on_follow = COALESCE($11, notify_on_follow),
            notify_on_message = COALESCE($12, notify_on_message),
            updated_at = NOW()
         WHERE user_id = $1
         RETURNING {SETTINGS_COLUMNS}"
    );
    sqlx::query_as::<_, UserSettings>(&query)
        .bind(user_id)
        .bind(update.profile_visibility.as_deref())
        .bind(update.show_email)
        .bind(update.show_statistics)
        .bind(update.allow_follow_requests)
        .bind(update.default_note_visibility.as_deref())
        .bind(update.auto_save_enabled)
        .bind(update.auto_save_interval)
        .bind(update.email_notifications)
        .bind(update.push_notifications)
        .bind(update.notify_on_follow)
        .bind(update.notify_on_message)
        .fetch_one(pool)
        .await
}
