use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::event::{RoomEvent, RoomEventError, RoomEventHandler};

use super::{connection_manager::ConnectionManager, messages::WebSocketMessage};

/// Fans room events out to every WebSocket connected to the room
pub struct WebSocketRoomSubscriber {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebSocketRoomSubscriber {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

#[async_trait]
impl RoomEventHandler for WebSocketRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        debug!(
            room_id = %room_id,
            event = event.event_type(),
            "Broadcasting room event to WebSocket connections"
        );

        let message = WebSocketMessage::from(event)
            .to_json()
            .map_err(|e| RoomEventError::HandlerError(e.to_string()))?;
        self.connection_manager.send_to_room(room_id, &message).await;
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "WebSocketRoomSubscriber"
    }
}
