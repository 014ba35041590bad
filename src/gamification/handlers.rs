//! Gamification HTTP handlers.

use axum::extract::{Path, State};
use axum::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::gamification::db;
use crate::gamification::types::{
    Currency, DailyTaskResponse, EarnRequest, RatingEntry, StreakResponse,
    TaskCompletionResponse, Transaction, UserRating, UserStatistics,
};
use crate::middleware::auth::AuthUser;

/// Largest single earn accepted from the client API.
const MAX_EARN_AMOUNT: i32 = 100;

pub async fn get_balance(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Currency>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::get_currency(&pool, auth.user_id).await?))
}

/// Credit coins for a client-reported event.
pub async fn earn(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<EarnRequest>,
) -> ApiResult<Json<Currency>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if request.amount <= 0 || request.amount > MAX_EARN_AMOUNT {
        return Err(ApiError::bad_request(format!(
            "Earn amount must be between 1 and {MAX_EARN_AMOUNT}"
        )));
    }
    if request.description.trim().is_empty() {
        return Err(ApiError::bad_request("Description is required"));
    }

    let currency = db::credit_currency(
        &pool,
        auth.user_id,
        request.amount,
        request.description.trim(),
    )
    .await?;
    tracing::info!(
        "User {} earned {} coins: {}",
        auth.username,
        request.amount,
        request.description.trim()
    );
    Ok(Json(currency))
}

pub async fn list_transactions(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::list_transactions(&pool, auth.user_id).await?))
}

/// Active tasks annotated with today's completion state.
pub async fn list_daily_tasks(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<Vec<DailyTaskResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let tasks = db::list_active_tasks(&pool).await?;
    let completed = db::completed_today(&pool, auth.user_id).await?;

    let responses = tasks
        .into_iter()
        .map(|task| DailyTaskResponse {
            completed_today: completed.contains(&task.id),
            task,
        })
        .collect();
    Ok(Json(responses))
}

pub async fn complete_task(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskCompletionResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let task = db::get_task(&pool, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    if !task.is_active {
        return Err(ApiError::bad_request("Task is no longer active"));
    }

    let currency = db::complete_task(&pool, auth.user_id, &task)
        .await?
        .ok_or_else(|| ApiError::bad_request("Task already completed today"))?;

    tracing::info!(
        "User {} completed task '{}' for {} coins",
        auth.username,
        task.title,
        task.reward
    );
    Ok(Json(TaskCompletionResponse {
        task_id: task.id,
        reward_earned: task.reward,
        balance: currency.balance,
    }))
}

pub async fn get_streak(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<StreakResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let stats = db::get_statistics(&pool, auth.user_id).await?;
    Ok(Json(StreakResponse {
        streak_days: stats.streak_days,
        longest_streak: stats.longest_streak,
        last_activity_date: stats.last_activity_date,
    }))
}

/// Record activity for today and return the advanced streak.
pub async fn check_streak(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<StreakResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let stats = db::touch_streak(&pool, auth.user_id).await?;
    Ok(Json(StreakResponse {
        streak_days: stats.streak_days,
        longest_streak: stats.longest_streak,
        last_activity_date: stats.last_activity_date,
    }))
}

pub async fn get_statistics(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<UserStatistics>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::get_statistics(&pool, auth.user_id).await?))
}

/// Recompute and return the caller's rating.
pub async fn get_my_rating(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
) -> ApiResult<Json<UserRating>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::recompute_rating(&pool, auth.user_id).await?))
}

/// Public rating board, top 100.
pub async fn rating_board(
    State(pool): State<Option<PgPool>>,
    AuthUser(_auth): AuthUser,
) -> ApiResult<Json<Vec<RatingEntry>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;
    Ok(Json(db::leaderboard(&pool).await?))
}
