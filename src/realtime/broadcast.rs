//! Room Broadcast Registry
//!
//! Per-room `tokio::sync::broadcast` channels for live message delivery.
//! Each chat room gets its own channel so rooms never see each other's
//! traffic. Subscribers receive a copy of every event sent while they are
//! attached; there is no replay of events sent before subscription.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Event kinds delivered over a room channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomEventType {
    Message,
    Typing,
    Read,
}

/// A single event on a room channel.
///
/// The payload is arbitrary JSON so the registry stays independent of the
/// chat message shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    #[serde(rename = "type")]
    pub event_type: RoomEventType,
    pub payload: serde_json::Value,
}

impl RoomEvent {
    pub fn message(payload: serde_json::Value) -> Self {
        Self {
            event_type: RoomEventType::Message,
            payload,
        }
    }

    pub fn typing(user_id: Uuid, username: &str) -> Self {
        Self {
            event_type: RoomEventType::Typing,
            payload: serde_json::json!({ "user_id": user_id, "username": username }),
        }
    }
}

/// Registry of per-room broadcast channels.
///
/// Channels are created lazily on first use and dropped by the periodic
/// cleanup task once they have no subscribers.
#[derive(Clone)]
pub struct RoomBroadcastState {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<RoomEvent>>>>,
}

impl RoomBroadcastState {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a room.
    pub fn get_sender(&self, room_id: Uuid) -> broadcast::Sender<RoomEvent> {
        let mut channels = self.channels.lock().expect("room channel map poisoned");
        channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(100).0)
            .clone()
    }

    /// Broadcast an event to all subscribers of a room.
    ///
    /// Returns the number of subscribers that received the event; 0 when the
    /// room has no live channel or no subscribers.
    pub fn broadcast(&self, room_id: Uuid, event: RoomEvent) -> usize {
        let sender = {
            let channels = self.channels.lock().expect("room channel map poisoned");
            channels.get(&room_id).cloned()
        };

        match sender {
            Some(sender) => match sender.send(event) {
                Ok(count) => {
                    tracing::debug!("room {} event delivered to {} subscribers", room_id, count);
                    count
                }
                Err(_) => 0,
            },
            None => 0,
        }
    }

    /// Drop channels with no subscribers.
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .expect("room channel map poisoned")
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    pub fn subscriber_count(&self, room_id: Uuid) -> usize {
        self.channels
            .lock()
            .expect("room channel map poisoned")
            .get(&room_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for RoomBroadcastState {
    fn default() -> Self {
        Self::new()
    }
}
