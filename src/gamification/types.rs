//! Gamification types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coin wallet. Balance never goes below zero, enforced both by the spend
/// query and a database constraint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Currency {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    /// Either "earn" or "spend".
    pub transaction_type: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyTask {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reward: i32,
    pub task_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Task with today's completion state for the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTaskResponse {
    #[serde(flatten)]
    pub task: DailyTask,
    pub completed_today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStatistics {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_notes: i32,
    pub total_characters: i32,
    pub total_words: i32,
    pub total_sessions: i32,
    pub streak_days: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub fireflies_count: i32,
    pub rating_score: f64,
    pub level: i32,
    pub experience_points: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: f64,
    pub rank: i32,
    pub last_calculated: DateTime<Utc>,
}

/// One row of the public rating board.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RatingEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub username: String,
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreakResponse {
    pub streak_days: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct EarnRequest {
    pub amount: i32,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCompletionResponse {
    pub task_id: Uuid,
    pub reward_earned: i32,
    pub balance: i32,
}
