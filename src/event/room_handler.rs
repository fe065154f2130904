use async_trait::async_trait;
use thiserror::Error;

use super::events::RoomEvent;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that react to room events
///
/// Handlers are not tied to WebSocket or connection specifics.
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError>;

    /// Name used in logs
    fn handler_name(&self) -> &'static str;
}
