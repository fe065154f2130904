use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use brainaim::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every outbound message per participant instead of writing to sockets
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, Vec<String>>>>,
    // participant_id -> room_id
    connected_players: Arc<RwLock<HashMap<String, String>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_connected_player(&self, participant_id: &str, room_id: &str) {
        self.connected_players
            .write()
            .await
            .insert(participant_id.to_string(), room_id.to_string());
    }

    pub async fn get_messages_for(&self, participant_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(participant_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(
        &self,
        participant_id: String,
        room_id: String,
        _sender: mpsc::UnboundedSender<String>,
    ) {
        self.add_connected_player(&participant_id, &room_id).await;
    }

    async fn remove_connection(&self, participant_id: &str) {
        self.connected_players.write().await.remove(participant_id);
    }

    async fn send_to_player(&self, participant_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(participant_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    async fn send_to_room(&self, room_id: &str, message: &str) {
        let members: Vec<String> = self
            .connected_players
            .read()
            .await
            .iter()
            .filter(|(_, room)| room.as_str() == room_id)
            .map(|(participant, _)| participant.clone())
            .collect();
        for participant_id in members {
            self.send_to_player(&participant_id, message).await;
        }
    }
}
