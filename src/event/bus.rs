use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

/// Buffered events per room before slow receivers start lagging
pub const ROOM_CHANNEL_CAPACITY: usize = 1024;

/// Event bus for distributing room events throughout the application
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    /// Room-specific event channels: room_id -> sender
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sender of a room's channel, creating the channel if needed
    pub async fn sender_for_room(&self, room_id: &str) -> broadcast::Sender<RoomEvent> {
        if let Some(sender) = self.room_channels.read().await.get(room_id) {
            return sender.clone();
        }

        let mut room_channels = self.room_channels.write().await;
        room_channels
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!(room_id = %room_id, "Creating room channel");
                broadcast::channel(ROOM_CHANNEL_CAPACITY).0
            })
            .clone()
    }

    /// Subscribe to events for a specific room
    pub async fn subscribe_to_room(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        self.sender_for_room(room_id).await.subscribe()
    }

    /// Forgets a room's channel. Receivers end once the remaining senders drop.
    pub async fn remove_room(&self, room_id: &str) {
        if self.room_channels.write().await.remove(room_id).is_some() {
            debug!(room_id = %room_id, "Room channel removed");
        }
    }
}
