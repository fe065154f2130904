use thiserror::Error;

use super::models::RoomPhase;
use crate::signal::ClaimError;

/// Broad category of a room rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    State,
    Conflict,
    Fatal,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room already exists: {0}")]
    RoomExists(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Participant {0} already joined")]
    AlreadyJoined(String),

    #[error("Unknown source: {0}")]
    SourceUnknown(String),

    #[error("Source {0} is taken")]
    SourceTaken(String),

    #[error("Cannot {operation} while room is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: RoomPhase,
    },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Round aborted: {0}")]
    RoundAborted(String),
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::RoomNotFound(_)
            | RoomError::ParticipantNotFound(_)
            | RoomError::AlreadyJoined(_)
            | RoomError::SourceUnknown(_)
            | RoomError::InvalidMessage(_) => ErrorKind::Validation,
            RoomError::InvalidPhase { .. } => ErrorKind::State,
            RoomError::SourceTaken(_) | RoomError::RoomExists(_) => ErrorKind::Conflict,
            RoomError::RoundAborted(_) => ErrorKind::Fatal,
        }
    }
}

impl From<ClaimError> for RoomError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Unknown(source) => RoomError::SourceUnknown(source),
            ClaimError::Taken(source) => RoomError::SourceTaken(source),
        }
    }
}
