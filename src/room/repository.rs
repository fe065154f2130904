use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{errors::RoomError, session::RoomSession};

/// Storage of live room sessions
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, session: Arc<RoomSession>) -> Result<(), RoomError>;
    async fn get_room(&self, room_id: &str) -> Result<Option<Arc<RoomSession>>, RoomError>;
    async fn list_rooms(&self) -> Result<Vec<Arc<RoomSession>>, RoomError>;
    async fn delete_room(&self, room_id: &str) -> Result<(), RoomError>;
}

/// In-memory implementation of RoomRepository
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, Arc<RoomSession>>>,
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, session), fields(room_id = %session.id()))]
    async fn create_room(&self, session: Arc<RoomSession>) -> Result<(), RoomError> {
        let mut rooms = self.rooms.lock();
        if rooms.contains_key(session.id()) {
            warn!("Room already exists in memory");
            return Err(RoomError::RoomExists(session.id().to_string()));
        }
        rooms.insert(session.id().to_string(), session);

        debug!("Room created in memory");
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<Arc<RoomSession>>, RoomError> {
        Ok(self.rooms.lock().get(room_id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Arc<RoomSession>>, RoomError> {
        Ok(self.rooms.lock().values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: &str) -> Result<(), RoomError> {
        match self.rooms.lock().remove(room_id) {
            Some(_) => {
                debug!(room_id = %room_id, "Room deleted from memory");
                Ok(())
            }
            None => Err(RoomError::RoomNotFound(room_id.to_string())),
        }
    }
}
