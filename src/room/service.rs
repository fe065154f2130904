use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::{
    errors::RoomError,
    models::{KeyAction, Room},
    session::{RoomSession, SessionContext},
    types::RoomResponse,
};
use crate::event::{RoomEventHandler, RoomSubscription};

/// Attempts at finding an unused generated room id
const ID_ATTEMPTS: usize = 8;

/// Service for room lifecycle and participant operations
pub struct RoomService {
    context: Arc<SessionContext>,
    subscribers: Vec<Arc<dyn RoomEventHandler>>,
    /// Serializes session creation so a room id gets exactly one channel subscription set
    create_lock: Mutex<()>,
}

impl RoomService {
    pub fn new(context: Arc<SessionContext>, subscribers: Vec<Arc<dyn RoomEventHandler>>) -> Self {
        Self {
            context,
            subscribers,
            create_lock: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Creates a new room with a generated ID
    #[instrument(skip(self))]
    pub async fn create_room(&self) -> Result<RoomResponse, RoomError> {
        let _guard = self.create_lock.lock().await;

        for _ in 0..ID_ATTEMPTS {
            let room_id = Room::generate_id();
            if self.context.repository.get_room(&room_id).await?.is_some() {
                debug!(room_id = %room_id, "Generated room ID already in use");
                continue;
            }
            let session = self.open_session(room_id).await?;
            info!(room_id = %session.id(), "Room created successfully");
            return Ok(session.summary().await);
        }

        Err(RoomError::RoomExists("generated id".to_string()))
    }

    /// Returns the live session of a room, creating the room on first use
    #[instrument(skip(self))]
    pub async fn get_or_create_room(&self, room_id: &str) -> Result<Arc<RoomSession>, RoomError> {
        if let Some(session) = self.context.repository.get_room(room_id).await? {
            return Ok(session);
        }

        let _guard = self.create_lock.lock().await;
        if let Some(session) = self.context.repository.get_room(room_id).await? {
            return Ok(session);
        }
        info!(room_id = %room_id, "Creating room on demand");
        self.open_session(room_id.to_string()).await
    }

    async fn open_session(&self, room_id: String) -> Result<Arc<RoomSession>, RoomError> {
        let sender = self.context.event_bus.sender_for_room(&room_id).await;
        for subscriber in &self.subscribers {
            RoomSubscription::new(
                room_id.clone(),
                subscriber.clone(),
                self.context.event_bus.clone(),
            )
            .start()
            .await;
        }

        let session = Arc::new(RoomSession::new(room_id, self.context.clone(), sender));
        self.context.repository.create_room(session.clone()).await?;
        Ok(session)
    }

    pub async fn get_room(&self, room_id: &str) -> Result<Arc<RoomSession>, RoomError> {
        self.context
            .repository
            .get_room(room_id)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    pub async fn get_room_details(&self, room_id: &str) -> Result<RoomResponse, RoomError> {
        Ok(self.get_room(room_id).await?.summary().await)
    }

    /// Lists all live rooms
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomResponse>, RoomError> {
        let sessions = self.context.repository.list_rooms().await?;
        let mut rooms = Vec::with_capacity(sessions.len());
        for session in sessions {
            rooms.push(session.summary().await);
        }
        rooms.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(room_count = rooms.len(), "Rooms listed");
        Ok(rooms)
    }

    pub async fn join(
        &self,
        room_id: &str,
        participant_id: &str,
        display_name: &str,
    ) -> Result<(), RoomError> {
        self.get_or_create_room(room_id)
            .await?
            .join(participant_id, display_name)
            .await
    }

    pub async fn set_bounds(
        &self,
        room_id: &str,
        participant_id: &str,
        width: f64,
        height: f64,
    ) -> Result<(), RoomError> {
        self.get_room(room_id)
            .await?
            .set_bounds(participant_id, width, height)
            .await
    }

    pub async fn select_source(
        &self,
        room_id: &str,
        participant_id: &str,
        source_id: &str,
    ) -> Result<(), RoomError> {
        self.get_room(room_id)
            .await?
            .select_source(participant_id, source_id)
            .await
    }

    pub async fn mark_ready(&self, room_id: &str, participant_id: &str) -> Result<(), RoomError> {
        self.get_room(room_id).await?.mark_ready(participant_id).await
    }

    pub async fn key(
        &self,
        room_id: &str,
        participant_id: &str,
        code: &str,
        action: KeyAction,
    ) -> Result<(), RoomError> {
        self.get_room(room_id)
            .await?
            .key(participant_id, code, action)
            .await
    }

    pub async fn disconnect(&self, room_id: &str, participant_id: &str) -> Result<(), RoomError> {
        self.get_room(room_id).await?.disconnect(participant_id).await
    }
}
