//! Server Initialization
//!
//! Builds the Axum application: loads the database, creates shared state,
//! configures routes, and spawns the periodic broadcast-channel cleanup.

use axum::Router;

use crate::realtime::broadcast::RoomBroadcastState;
use crate::routes::router::create_router;
use crate::server::config::load_database;
use crate::server::state::AppState;

/// Interval for dropping subscriber-less room channels.
const BROADCAST_CLEANUP_SECS: u64 = 300;

/// Create and configure the Axum application.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing lumen backend server");

    let db_pool = load_database().await;

    let app_state = AppState {
        db_pool,
        room_broadcast: RoomBroadcastState::new(),
    };

    let app = create_router(app_state.clone());

    // Drop room channels nobody is subscribed to anymore.
    let cleanup_state = app_state.room_broadcast.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(BROADCAST_CLEANUP_SECS));
        loop {
            interval.tick().await;
            cleanup_state.cleanup_inactive_channels();
            tracing::debug!("Cleaned up inactive room broadcast channels");
        }
    });

    tracing::info!("Router configured");

    app
}

/// Create the application with externally supplied state.
///
/// Used by integration tests to inject a test database pool.
pub fn create_app_with_state(app_state: AppState) -> Router<()> {
    create_router(app_state)
}
