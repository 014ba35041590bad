//! Social HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::users::{get_user_by_username, search_users, update_profile, User};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::notes::types::NoteResponse;
use crate::notes;
use crate::social::db;
use crate::social::types::{
    FireflyResponse, FollowEntry, ProfileResponse, SendFireflyRequest, UpdateProfileRequest,
    UpdateSettingsRequest, UserSearchParams, UserSettings,
};

const VISIBILITY_VALUES: &[&str] = &["private", "followers", "public"];

async fn find_profile(pool: &PgPool, username: &str) -> Result<User, ApiError> {
    get_user_by_username(pool, username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// A user's public profile. Private profiles are only visible to their
/// owner and their followers.
pub async fn get_profile(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let user = find_profile(&pool, &username).await?;
    let is_following = db::is_following(&pool, auth.user_id, user.id).await?;

    if !user.is_public && user.id != auth.user_id && !is_following {
        return Err(ApiError::forbidden("This profile is private"));
    }
    Ok(Json(ProfileResponse::from_user(&user, is_following)))
}

pub async fn update_my_profile(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if let Some(ref bio) = request.bio {
        if bio.len() > 1000 {
            return Err(ApiError::bad_request("Bio cannot exceed 1000 characters"));
        }
    }

    let user = update_profile(
        &pool,
        auth.user_id,
        request.bio.as_deref(),
        request.location.as_deref(),
        request.website.as_deref(),
        request.is_public,
    )
    .await?;
    Ok(Json(ProfileResponse::from_user(&user, false)))
}

pub async fn search_profiles(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
    Query(params): Query<UserSearchParams>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let term = params.q.trim();
    if term.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users = search_users(&pool, term, 20).await?;
    let responses = users
        .iter()
        .filter(|u| u.is_public)
        .map(|u| ProfileResponse::from_user(u, false))
        .collect();
    Ok(Json(responses))
}

pub async fn follow_user(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let target = find_profile(&pool, &username).await?;
    if target.id == auth.user_id {
        return Err(ApiError::bad_request("Cannot follow yourself"));
    }

    db::follow(&pool, auth.user_id, target.id).await?;
    tracing::info!("User {} followed {}", auth.username, target.username);
    Ok(Json(json!({ "message": "Following", "username": target.username })))
}

pub async fn unfollow_user(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let target = find_profile(&pool, &username).await?;
    if !db::unfollow(&pool, auth.user_id, target.id).await? {
        return Err(ApiError::bad_request("Not following this user"));
    }
    Ok(Json(json!({ "message": "Unfollowed", "username": target.username })))
}

pub async fn list_followers(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<FollowEntry>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let user = find_profile(&pool, &username).await?;
    Ok(Json(db::list_followers(&pool, user.id).await?))
}

pub async fn list_following(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<FollowEntry>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let user = find_profile(&pool, &username).await?;
    Ok(Json(db::list_following(&pool, user.id).await?))
}

/// Another user's shareable notes, visibility-filtered for the viewer.
pub async fn list_user_notes(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let owner = find_profile(&pool, &username).await?;
    let viewer_follows =
        owner.id == auth.user_id || db::is_following(&pool, auth.user_id, owner.id).await?;

    let visible = db::list_visible_notes(&pool, owner.id, viewer_follows).await?;
    let mut responses = Vec::with_capacity(visible.len());
    for note in &visible {
        let tags = notes::db::get_tag_ids(&pool, note.id).await?;
        responses.push(NoteResponse::from_note(note, tags));
    }
    Ok(Json(responses))
}

pub async fn send_firefly(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<SendFireflyRequest>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if request.receiver_id == auth.user_id {
        return Err(ApiError::bad_request("Cannot send a firefly to yourself"));
    }
    crate::auth::users::get_user_by_id(&pool, request.receiver_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(ref message) = request.message {
        if message.len() > 500 {
            return Err(ApiError::bad_request(
                "Firefly message cannot exceed 500 characters",
            ));
        }
    }

    // Only the receiver's own notes can be referenced; anything else is
    // silently dropped.
    let note_id = match request.note_id {
        Some(note_id) => notes::db::get_note_for_user(&pool, note_id, request.receiver_id)
            .await?
            .map(|note| note.id),
        None => None,
    };

    let firefly_id = db::send_firefly(
        &pool,
        auth.user_id,
        request.receiver_id,
        note_id,
        request.message.as_deref(),
    )
    .await?;

    tracing::info!("User {} sent firefly {}", auth.username, firefly_id);
    Ok(Json(json!({ "message": "Firefly sent", "id": firefly_id })))
}

pub async fn list_fireflies(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<FireflyResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::list_received_fireflies(&pool, auth.user_id).await?))
}

pub async fn get_settings(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<UserSettings>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::get_settings(&pool, auth.user_id).await?))
}

pub async fn update_settings(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<UserSettings>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if let Some(ref visibility) = request.profile_visibility {
        if !["public", "followers", "private"].contains(&visibility.as_str()) {
            return Err(ApiError::bad_request("Invalid profile visibility"));
        }
    }
    if let Some(ref visibility) = request.default_note_visibility {
        if !VISIBILITY_VALUES.contains(&visibility.as_str()) {
            return Err(ApiError::bad_request("Invalid default note visibility"));
        }
    }
    if let Some(interval) = request.auto_save_interval {
        if !(5..=600).contains(&interval) {
            return Err(ApiError::bad_request(
                "Auto-save interval must be between 5 and 600 seconds",
            ));
        }
    }

    Ok(Json(db::update_settings(&pool, auth.user_id, &request).await?))
}
