//! Login and Logout Handlers
//!
//! POST /api/auth/login, POST /api/auth/logout
//!
//! Login verifies credentials with bcrypt and returns a JWT. Sessions are
//! stateless, so logout only acknowledges; the client discards its token.

use axum::{extract::State, response::Json};
use bcrypt::verify;
use sqlx::PgPool;

use crate::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::auth::sessions::create_token;
use crate::auth::users::get_user_by_username;
use crate::error::{ApiError, ApiResult};

pub async fn login(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    tracing::info!("Login attempt for username: {}", username);

    let user = get_user_by_username(&pool, username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let password_ok = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Failed to verify password: {:?}", e);
        ApiError::internal("Server error")
    })?;

    if !password_ok {
        tracing::warn!("Invalid password for username: {}", username);
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = create_token(user.id, user.username.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        ApiError::internal("Server error")
    })?;

    tracing::info!("Login successful for: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Logged out successfully" }))
}
