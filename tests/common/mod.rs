//! Shared test fixtures.

pub mod auth_helpers;
pub mod database;

use axum_test::TestServer;
use lumen_notes::realtime::broadcast::RoomBroadcastState;
use lumen_notes::server::init::create_app_with_state;
use lumen_notes::server::state::AppState;

use database::TestDatabase;

/// Build a test server over a fresh application wired to the test database.
pub fn test_server(db: &TestDatabase) -> TestServer {
    let state = AppState {
        db_pool: Some(db.pool().clone()),
        room_broadcast: RoomBroadcastState::new(),
    };
    TestServer::new(create_app_with_state(state)).expect("Failed to start test server")
}
