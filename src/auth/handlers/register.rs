//! Registration Handler
//!
//! POST /api/auth/register
//!
//! Validates the username, email, and password, creates the account, and
//! returns a JWT so the client is authenticated immediately. Passwords are
//! hashed with bcrypt and never returned in responses.

use axum::{extract::State, response::Json};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;

use crate::auth::handlers::types::{AuthResponse, RegisterRequest, UserResponse};
use crate::auth::sessions::create_token;
use crate::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::error::{ApiError, ApiResult};

/// Validate username format.
///
/// Usernames must be 3-30 characters, start with a letter, and contain only
/// alphanumeric characters and underscores.
pub(crate) fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub async fn register(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let username = request.username.trim().to_string();
    tracing::info!("Registration request for username: {}", username);

    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    if !is_valid_username(&username) {
        return Err(ApiError::bad_request(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if request.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    // Missing email falls back to a placeholder, matching the web client.
    let email = match request.email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => {
            if !e.contains('@') {
                return Err(ApiError::bad_request("Invalid email format"));
            }
            e.to_string()
        }
        _ => format!("{}@example.com", username),
    };

    if get_user_by_username(&pool, &username).await?.is_some() {
        return Err(ApiError::bad_request("Username already taken"));
    }

    if get_user_by_email(&pool, &email).await?.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        ApiError::internal("Server error")
    })?;

    let user = create_user(&pool, username, email, password_hash).await?;

    let token = create_token(user.id, user.username.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        ApiError::internal("Server error")
    })?;

    tracing::info!("User created: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
