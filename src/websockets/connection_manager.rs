use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(
        &self,
        participant_id: String,
        room_id: String,
        sender: mpsc::UnboundedSender<String>,
    );

    async fn remove_connection(&self, participant_id: &str);

    async fn send_to_player(&self, participant_id: &str, message: &str);

    async fn send_to_room(&self, room_id: &str, message: &str);
}

struct ConnectionEntry {
    room_id: String,
    sender: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
pub struct InMemoryConnectionManager {
    // participant_id -> room and outbound sender
    connections: Arc<RwLock<HashMap<String, ConnectionEntry>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(
        &self,
        participant_id: String,
        room_id: String,
        sender: mpsc::UnboundedSender<String>,
    ) {
        let mut connections = self.connections.write().await;
        connections.insert(participant_id, ConnectionEntry { room_id, sender });
    }

    async fn remove_connection(&self, participant_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(participant_id);
    }

    async fn send_to_player(&self, participant_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(entry) = connections.get(participant_id) {
            let _ = entry.sender.send(message.to_string());
        }
    }

    async fn send_to_room(&self, room_id: &str, message: &str) {
        let connections = self.connections.read().await;
        let mut delivered = 0;
        for entry in connections.values().filter(|e| e.room_id == room_id) {
            if entry.sender.send(message.to_string()).is_ok() {
                delivered += 1;
            }
        }
        debug!(room_id = %room_id, delivered = delivered, "Sent message to room");
    }
}
