//! Real-time delivery for chat rooms.

pub mod broadcast;

pub use broadcast::{RoomBroadcastState, RoomEvent};
