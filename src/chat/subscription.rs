//! Live room subscription over Server-Sent Events.
//!
//! Subscribers attach to the room's broadcast channel and receive every
//! event from that point on. There is no replay; clients load history over
//! REST first and then subscribe.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{unfold, Stream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use uuid::Uuid;

use crate::chat::db;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::realtime::broadcast::RoomEvent;
use crate::server::state::AppState;

/// Subscribe to a room's live event feed. Membership is checked before the
/// stream is handed out.
pub async fn subscribe_room(
    State(app_state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(room_id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let pool = app_state
        .db_pool
        .clone()
        .ok_or(ApiError::DatabaseUnavailable)?;

    db::get_room(&pool, room_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    db::get_membership(&pool, room_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Not a member of this room"))?;

    let receiver = app_state.room_broadcast.get_sender(room_id).subscribe();
    tracing::info!("User {} subscribed to room {}", auth.username, room_id);

    Ok(Sse::new(event_stream(receiver)).keep_alive(KeepAlive::default()))
}

/// Turn a broadcast receiver into an SSE event stream. Lagged receivers skip
/// ahead instead of closing; the stream ends when the channel is dropped.
fn event_stream(receiver: Receiver<RoomEvent>) -> impl Stream<Item = Result<Event, Infallible>> {
    unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(data) => return Some((Ok(Event::default().data(data)), receiver)),
                    Err(e) => {
                        tracing::error!("Failed to serialize room event: {:?}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("SSE subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
