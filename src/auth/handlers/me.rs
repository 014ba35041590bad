//! Current User Handler
//!
//! GET /api/auth/me returns the authenticated user's own record.

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::auth::handlers::types::UserResponse;
use crate::auth::users::get_user_by_id;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;

pub async fn get_me(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let user = get_user_by_id(&pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(&user)))
}
