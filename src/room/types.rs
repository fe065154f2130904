use serde::{Deserialize, Serialize};

use super::models::{Room, RoomPhase};

/// Response for room creation and room information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub phase: RoomPhase,
    pub participant_count: usize,
    pub ready_count: usize,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            phase: room.phase,
            participant_count: room.participant_count(),
            ready_count: room.ready_count,
        }
    }
}
