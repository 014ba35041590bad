//! Gamification: coin balances, transactions, daily tasks, writing streaks,
//! per-user statistics, and the public rating board.

pub mod db;
pub mod handlers;
pub mod types;

/// Coins credited for creating a note.
pub const NOTE_CREATION_REWARD: i32 = 10;
