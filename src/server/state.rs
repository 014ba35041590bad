//! Application State
//!
//! `AppState` is the central state container handed to the router. It holds
//! the optional database pool and the per-room broadcast registry. `FromRef`
//! implementations let handlers extract just the piece they need.

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::realtime::broadcast::RoomBroadcastState;

/// Shared application state.
///
/// Both fields are cheap to clone: the pool is reference-counted internally
/// and the broadcast registry is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, `None` when `DATABASE_URL` is not set.
    /// Handlers answer 503 for database-backed operations in that case.
    pub db_pool: Option<PgPool>,

    /// Per-room broadcast channels for live chat delivery.
    pub room_broadcast: RoomBroadcastState,
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for RoomBroadcastState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.room_broadcast.clone()
    }
}
