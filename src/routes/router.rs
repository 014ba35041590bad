//! Router Configuration
//!
//! Combines all route groups into a single Axum router. Public auth routes
//! are mounted as-is; everything else sits behind the JWT middleware applied
//! inside its route group. A trace layer logs every request.

use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::handlers::{login, register};
use crate::routes::api_routes::configure_api_routes;
use crate::routes::chat_routes::configure_chat_routes;
use crate::server::state::AppState;

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        // Public authentication endpoints
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let router = configure_api_routes(router, app_state.clone());
    let router = configure_chat_routes(router, app_state.clone());

    router
        .fallback(|| async { "404 Not Found" })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
