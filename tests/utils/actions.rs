use serde_json::json;
use tokio::time::{sleep, Duration};

use brainaim::websockets::{ConnectionManager, MessageHandler, MessageType, WebSocketMessage};

use super::setup::{TestSetup, ROOM_ID};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw client message without waiting
    pub async fn send_raw(&self, participant_id: &str, message: String) {
        self.input_handlers
            .get(participant_id)
            .unwrap_or_else(|| panic!("{participant_id} is not connected"))
            .handle_message(participant_id, ROOM_ID, message)
            .await;
    }

    /// Send a WebSocket message and wait for processing
    pub async fn send_message(&self, participant_id: &str, message: WebSocketMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(participant_id, message_json).await;
        sleep(Duration::from_millis(10)).await;
    }

    /// Wait for in-flight events to reach the connections
    pub async fn settle(&self) {
        sleep(Duration::from_millis(10)).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&self, participant_id: &str) {
        self.send_message(
            participant_id,
            WebSocketMessage::new(MessageType::Join, json!({ "name": participant_id })),
        )
        .await;
    }

    pub async fn join_all(&self) {
        for player in &self.players {
            self.send_join(player).await;
        }
    }

    pub async fn send_bounds(&self, participant_id: &str, width: f64, height: f64) {
        self.send_message(
            participant_id,
            WebSocketMessage::new(
                MessageType::Bounds,
                json!({ "width": width, "height": height }),
            ),
        )
        .await;
    }

    pub async fn send_select_source(&self, participant_id: &str, source_id: &str) {
        self.send_message(
            participant_id,
            WebSocketMessage::new(MessageType::SelectSource, json!({ "id": source_id })),
        )
        .await;
    }

    pub async fn send_ready(&self, participant_id: &str) {
        self.send_message(
            participant_id,
            WebSocketMessage::new(MessageType::Ready, json!({})),
        )
        .await;
    }

    pub async fn ready_all(&self) {
        for player in &self.players {
            self.send_ready(player).await;
        }
    }

    pub async fn send_key(&self, participant_id: &str, code: &str, key_type: &str) {
        self.send_message(
            participant_id,
            WebSocketMessage::new(MessageType::Key, json!({ "code": code, "type": key_type })),
        )
        .await;
    }

    /// Simulate the client's socket closing
    pub async fn close_socket(&self, participant_id: &str) {
        self.mock_conn_manager
            .remove_connection(participant_id)
            .await;
        let _ = self
            .state
            .room_service
            .disconnect(ROOM_ID, participant_id)
            .await;
        sleep(Duration::from_millis(10)).await;
    }

    /// Feed one signal batch through the transport entry point
    pub fn ingest(&self, address: &str, values: &[f64]) {
        self.state
            .ingestor
            .ingest_address(address, values)
            .unwrap();
    }
}
