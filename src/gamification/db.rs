//! Gamification database operations.
//!
//! Every coin mutation runs inside a transaction that pairs the wallet
//! update with its transaction-log row. Spends guard the balance in the
//! UPDATE itself so two concurrent purchases can never drive it negative.

use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::gamification::types::{
    Currency, DailyTask, RatingEntry, Transaction, UserRating, UserStatistics,
};

const CURRENCY_COLUMNS: &str =
    "id, user_id, balance, total_earned, total_spent, created_at, updated_at";

const STATS_COLUMNS: &str = "id, user_id, total_notes, total_characters, total_words, \
     total_sessions, streak_days, longest_streak, last_activity_date, fireflies_count, \
     rating_score, level, experience_points, updated_at";

async fn ensure_currency(
    tx: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO currencies (id, user_id, created_at, updated_at)
         VALUES ($1, $2, NOW(), NOW())
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Fetch the user's wallet, creating an empty one on first touch.
pub async fn get_currency(pool: &PgPool, user_id: Uuid) -> Result<Currency, sqlx::Error> {
    let mut tx = pool.begin().await?;
    ensure_currency(&mut tx, user_id).await?;
    let query = format!("SELECT {CURRENCY_COLUMNS} FROM currencies WHERE user_id = $1");
    let currency = sqlx::query_as::<_, Currency>(&query)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(currency)
}

async fn log_transaction(
    tx: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    amount: i32,
    transaction_type: &str,
    description: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, amount, transaction_type, description, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW())",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(amount)
    .bind(transaction_type)
    .bind(description)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Add coins and log the earn in one transaction.
pub async fn credit_currency(
    pool: &PgPool,
    user_id: Uuid,
    amount: i32,
    description: &str,
) -> Result<Currency, sqlx::Error> {
    let mut tx = pool.begin().await?;
    ensure_currency(&mut tx, user_id).await?;

    let query = format!(
        "UPDATE currencies
         SET balance = balance + $2, total_earned = total_earned + $2, updated_at = NOW()
         WHERE user_id = $1
         RETURNING {CURRENCY_COLUMNS}"
    );
    let currency = sqlx::query_as::<_, Currency>(&query)
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

    log_transaction(&mut tx, user_id, amount, "earn", description).await?;
    tx.commit().await?;
    Ok(currency)
}

/// Remove coins, refusing when the balance is insufficient.
///
/// Returns `None` when the user cannot afford the amount. The balance guard
/// sits in the UPDATE's WHERE clause so the check and the write are one
/// atomic statement.
pub async fn debit_currency(
    pool: &PgPool,
    user_id: Uuid,
    amount: i32,
    description: &str,
) -> Result<Option<Currency>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    ensure_currency(&mut tx, user_id).await?;

    let query = format!(
        "UPDATE currencies
         SET balance = balance - $2, total_spent = total_spent + $2, updated_at = NOW()
         WHERE user_id = $1 AND balance >= $2
         RETURNING {CURRENCY_COLUMNS}"
    );
    let currency = sqlx::query_as::<_, Currency>(&query)
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(currency) = currency else {
        tx.rollback().await?;
        return Ok(None);
    };

    log_transaction(&mut tx, user_id, amount, "spend", description).await?;
    tx.commit().await?;
    Ok(Some(currency))
}

/// Debit inside a caller-owned transaction, for purchases that must commit
/// together with their side effects.
pub async fn debit_currency_tx(
    tx: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    amount: i32,
    description: &str,
) -> Result<Option<Currency>, sqlx::Error> {
    ensure_currency(tx, user_id).await?;

    let query = format!(
        "UPDATE currencies
         SET balance = balance - $2, total_spent = total_spent + $2, updated_at = NOW()
         WHERE user_id = $1 AND balance >= $2
         RETURNING {CURRENCY_COLUMNS}"
    );
    let currency = sqlx::query_as::<_, Currency>(&query)
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;

    let Some(currency) = currency else {
        return Ok(None);
    };

    log_transaction(tx, user_id, amount, "spend", description).await?;
    Ok(Some(currency))
}

/// Latest transactions, newest first, capped at 50.
pub async fn list_transactions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "SELECT id, user_id, amount, transaction_type, description, created_at
         FROM transactions WHERE user_id = $1
         ORDER BY created_at DESC LIMIT 50",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

async fn ensure_statistics(
    tx: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_statistics (id, user_id, updated_at)
         VALUES ($1, $2, NOW())
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_statistics(pool: &PgPool, user_id: Uuid) -> Result<UserStatistics, sqlx::Error> {
    let mut tx = pool.begin().await?;
    ensure_statistics(&mut tx, user_id).await?;
    let query = format!("SELECT {STATS_COLUMNS} FROM user_statistics WHERE user_id = $1");
    let stats = sqlx::query_as::<_, UserStatistics>(&query)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(stats)
}

/// Next streak state given the last activity date.
///
/// Same-day activity changes nothing. Activity the day after the last one
/// extends the streak. A gap folds the finished run into the longest streak
/// and starts over at one.
pub fn advance_streak(
    streak_days: i32,
    longest_streak: i32,
    last_activity: Option<NaiveDate>,
    today: NaiveDate,
) -> (i32, i32) {
    match last_activity {
        Some(last) if last == today => (streak_days, longest_streak),
        Some(last) if last.succ_opt() == Some(today) => {
            let extended = streak_days + 1;
            (extended, longest_streak.max(extended))
        }
        _ => (1, longest_streak.max(streak_days).max(1)),
    }
}

/// Record activity for today and advance the streak. Row-locked so two
/// requests on the same day cannot double-extend.
pub async fn touch_streak(pool: &PgPool, user_id: Uuid) -> Result<UserStatistics, sqlx::Error> {
    let mut tx = pool.begin().await?;
    ensure_statistics(&mut tx, user_id).await?;

    let query = format!("SELECT {STATS_COLUMNS} FROM user_statistics WHERE user_id = $1 FOR UPDATE");
    let stats = sqlx::query_as::<_, UserStatistics>(&query)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    let today = Utc::now().date_naive();
    let (streak_days, longest_streak) = advance_streak(
        stats.streak_days,
        stats.longest_streak,
        stats.last_activity_date,
        today,
    );

    let query = format!(
        "UPDATE user_statistics
         SET streak_days = $2, longest_streak = $3, last_activity_date = $4, updated_at = NOW()
         WHERE user_id = $1
         RETURNING {STATS_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, UserStatistics>(&query)
        .bind(user_id)
        .bind(streak_days)
        .bind(longest_streak)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Bump note counters and streak for a freshly created note.
pub async fn record_note_created(
    pool: &PgPool,
    user_id: Uuid,
    content: &str,
) -> Result<(), sqlx::Error> {
    let characters = content.chars().count() as i32;
    let words = content.split_whitespace().count() as i32;

    let mut tx = pool.begin().await?;
    ensure_statistics(&mut tx, user_id).await?;
    sqlx::query(
        "UPDATE user_statistics
         SET total_notes = total_notes + 1,
             total_characters = total_characters + $2,
             total_words = total_words + $3,
             experience_points = experience_points + 10,
             level = 1 + (experience_points + 10) / 100,
             updated_at = NOW()
         WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(characters)
    .bind(words)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    touch_streak(pool, user_id).await?;
    Ok(())
}

/// Rating formula over the user's statistics.
pub fn rating_score(stats: &UserStatistics) -> f64 {
    (stats.total_notes * 10 + stats.total_sessions * 5 + stats.streak_days * 20) as f64
}

/// Recompute and store the user's rating.
pub async fn recompute_rating(pool: &PgPool, user_id: Uuid) -> Result<UserRating, sqlx::Error> {
    let stats = get_statistics(pool, user_id).await?;
    let rating = rating_score(&stats);

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE user_statistics SET rating_score = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(rating)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, UserRating>(
        "INSERT INTO user_ratings (id, user_id, rating, rank, last_calculated)
         VALUES ($1, $2, $3, 0, NOW())
         ON CONFLICT (user_id) DO UPDATE SET rating = $3, last_calculated = NOW()
         RETURNING id, user_id, rating, rank, last_calculated",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(rating)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// Top 100 users by rating with dense ranks.
pub async fn leaderboard(pool: &PgPool) -> Result<Vec<RatingEntry>, sqlx::Error> {
    sqlx::query_as::<_, RatingEntry>(
        "SELECT ROW_NUMBER() OVER (ORDER BY ur.rating DESC, u.username ASC) AS rank,
                ur.user_id, u.username, ur.rating
         FROM user_ratings ur
         JOIN users u ON u.id = ur.user_id
         ORDER BY ur.rating DESC, u.username ASC
         LIMIT 100",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_active_tasks(pool: &PgPool) -> Result<Vec<DailyTask>, sqlx::Error> {
    sqlx::query_as::<_, DailyTask>(
        "SELECT id, title, description, reward, task_type, is_active, created_at
         FROM daily_tasks WHERE is_active ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn get_task(pool: &PgPool, task_id: Uuid) -> Result<Option<DailyTask>, sqlx::Error> {
    sqlx::query_as::<_, DailyTask>(
        "SELECT id, title, description, reward, task_type, is_active, created_at
         FROM daily_tasks WHERE id = $1",
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await
}

/// Task ids the user completed today.
pub async fn completed_today(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT task_id FROM task_completions
         WHERE user_id = $1 AND completed_on = CURRENT_DATE",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Complete a task for today, crediting its reward once.
///
/// Returns `None` when the task was already completed today. The uniqueness
/// constraint on (user, task, day) makes the insert the arbiter, so two
/// concurrent completions pay out once.
pub async fn complete_task(
    pool: &PgPool,
    user_id: Uuid,
    task: &DailyTask,
) -> Result<Option<Currency>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO task_completions (id, user_id, task_id, completed_at, completed_on, reward_earned)
         VALUES ($1, $2, $3, NOW(), CURRENT_DATE, $4)
         ON CONFLICT (user_id, task_id, completed_on) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(task.id)
    .bind(task.reward)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    ensure_currency(&mut tx, user_id).await?;
    let query = format!(
        "UPDATE currencies
         SET balance = balance + $2, total_earned = total_earned + $2, updated_at = NOW()
         WHERE user_id = $1
         RETURNING {CURRENCY_COLUMNS}"
    );
    let currency = sqlx::query_as::<_, Currency>(&query)
        .bind(user_id)
        .bind(task.reward)
        .fetch_one(&mut *tx)
        .await?;

    log_transaction(
        &mut tx,
        user_id,
        task.reward,
        "earn",
        &format!("Task completed: {}", task.title),
    )
    .await?;

    tx.commit().await?;
    Ok(Some(currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_streak_same_day_is_noop() {
        let today = day(2026, 8, 29);
        assert_eq!(advance_streak(5, 8, Some(today), today), (5, 8));
    }

    #[test]
    fn test_streak_extends_from_yesterday() {
        let today = day(2026, 8, 29);
        let yesterday = day(2026, 8, 28);
        assert_eq!(advance_streak(5, 8, Some(yesterday), today), (6, 8));
    }

    #[test]
    fn test_streak_extension_can_set_new_longest() {
        let today = day(2026, 8, 29);
        let yesterday = day(2026, 8, 28);
        assert_eq!(advance_streak(8, 8, Some(yesterday), today), (9, 9));
    }

    #[test]
    fn test_streak_gap_folds_into_longest_and_resets() {
        let today = day(2026, 8, 29);
        let last_week = day(2026, 8, 20);
        assert_eq!(advance_streak(12, 8, Some(last_week), today), (1, 12));
    }

    #[test]
    fn test_streak_first_activity() {
        let today = day(2026, 8, 29);
        assert_eq!(advance_streak(0, 0, None, today), (1, 1));
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let today = day(2026, 9, 1);
        let yesterday = day(2026, 8, 31);
        assert_eq!(advance_streak(3, 3, Some(yesterday), today), (4, 4));
    }

    #[test]
    fn test_rating_formula() {
        let stats = UserStatistics {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_notes: 7,
            total_characters: 0,
            total_words: 0,
            total_sessions: 3,
            streak_days: 4,
            longest_streak: 4,
            last_activity_date: None,
            fireflies_count: 0,
            rating_score: 0.0,
            level: 1,
            experience_points: 0,
            updated_at: Utc::now(),
        };
        assert_eq!(rating_score(&stats), (70 + 15 + 80) as f64);
    }
}
