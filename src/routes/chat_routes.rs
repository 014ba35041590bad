//! Chat Route Handlers
//!
//! Room management, message history, the live SSE subscription, and typing
//! indicators. All chat routes require authentication.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::chat::handlers as chat;
use crate::chat::subscription::subscribe_room;
use crate::middleware::auth::auth_middleware;
use crate::server::state::AppState;

/// Configure chat-related routes.
pub fn configure_chat_routes(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/api/chat/rooms",
            get(chat::list_rooms).post(chat::create_room),
        )
        .route("/api/chat/rooms/{room_id}", get(chat::get_room))
        .route(
            "/api/chat/rooms/{room_id}/messages",
            get(chat::list_messages).post(chat::send_message),
        )
        .route(
            "/api/chat/rooms/{room_id}/subscribe",
            get(subscribe_room),
        )
        .route("/api/chat/rooms/{room_id}/typing", post(chat::typing))
        .route("/api/chat/rooms/{room_id}/read", post(chat::mark_read))
        .route(
            "/api/chat/rooms/{room_id}/favorite",
            post(chat::toggle_favorite),
        )
        .route("/api/chat/search", get(chat::search_messages))
        .route_layer(from_fn_with_state(app_state, auth_middleware));

    router.merge(protected)
}
