//! Social request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::users::User;

/// Profile as seen by other users. Email and password hash never appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub is_public: bool,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: DateTime<Utc>,
    /// Whether the requesting user follows this profile.
    pub is_following: bool,
}

impl ProfileResponse {
    pub fn from_user(user: &User, is_following: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            website: user.website.clone(),
            avatar: user.avatar.clone(),
            is_public: user.is_public,
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at,
            is_following,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    #[serde(default)]
    pub q: String,
}

/// Compact user entry for follower/following lists.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEntry {
    pub user_id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub followed_at: DateTime<Utc>,
}

/// A firefly is a small appreciation token sent to another user, optionally
/// attached to one of their public notes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FireflyResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub note_id: Option<Uuid>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SendFireflyRequest {
    pub receiver_id: Uuid,
    pub note_id: Option<Uuid>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_visibility: String,
    pub show_email: bool,
    pub show_statistics: bool,
    pub allow_follow_requests: bool,
    pub default_note_visibility: String,
    pub auto_save_enabled: bool,
    pub auto_save_interval: i32,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub notify_on_follow: bool,
    pub notify_on_message: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub profile_visibility: Option<String>,
    pub show_email: Option<bool>,
    pub show_statistics: Option<bool>,
    pub allow_follow_requests: Option<bool>,
    pub default_note_visibility: Option<String>,
    pub auto_save_enabled: Option<bool>,
    pub auto_save_interval: Option<i32>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub notify_on_follow: Option<bool>,
    pub notify_on_message: Option<bool>,
}
