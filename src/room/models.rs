use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use strum_macros::{Display, EnumString};

use super::errors::RoomError;
use super::palette::ColorPair;

/// Canvas coordinates; y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Client-reported canvas size. A zero extent means "not reported yet".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of the canvas, or the origin on axes without a bound
    pub fn centre(&self) -> Position {
        let half = |extent: f64| if extent > 0.0 { extent / 2.0 } else { 0.0 };
        Position::new(half(self.width), half(self.height))
    }
}

/// Movement directions a participant can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Maps a browser `KeyboardEvent.code` (arrows or WASD) to a direction
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(Direction::Up),
            "ArrowDown" | "KeyS" => Some(Direction::Down),
            "ArrowLeft" | "KeyA" => Some(Direction::Left),
            "ArrowRight" | "KeyD" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    #[serde(rename = "keydown")]
    Down,
    #[serde(rename = "keyup")]
    Up,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub bound_source: Option<String>,
    pub position: Position,
    pub held_keys: HashSet<Direction>,
    pub bounds: Bounds,
    pub colors: Option<ColorPair>,
    pub ready: bool,
    /// Join order within the room
    pub seat: usize,
}

impl Participant {
    pub fn new(id: String, display_name: String, seat: usize) -> Self {
        Self {
            id,
            display_name,
            bound_source: None,
            position: Position::default(),
            held_keys: HashSet::new(),
            bounds: Bounds::default(),
            colors: None,
            ready: false,
            seat,
        }
    }

    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            id: self.id.clone(),
            name: self.display_name.clone(),
            source: self.bound_source.clone(),
            ready: self.ready,
        }
    }
}

/// What other clients get to see about a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: String,
    pub name: String,
    pub source: Option<String>,
    pub ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RoomPhase {
    Lobby,
    Active,
    Closed,
}

/// State of one room; mutated only under the owning session's lock
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub phase: RoomPhase,
    pub participants: HashMap<String, Participant>,
    pub ready_count: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub duration: Duration,
    next_seat: usize,
}

impl Room {
    pub fn new(id: String, duration: Duration) -> Self {
        Self {
            id,
            phase: RoomPhase::Lobby,
            participants: HashMap::new(),
            ready_count: 0,
            created_at: Utc::now(),
            started_at: None,
            duration,
            next_seat: 0,
        }
    }

    /// Generates a fresh room id
    pub fn generate_id() -> String {
        petname::Petnames::default().generate_one(2, "-")
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn require_phase(&self, operation: &'static str, phase: RoomPhase) -> Result<(), RoomError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(RoomError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    pub fn require_open(&self, operation: &'static str) -> Result<(), RoomError> {
        if self.phase == RoomPhase::Closed {
            Err(RoomError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        } else {
            Ok(())
        }
    }

    pub fn participant(&self, participant_id: &str) -> Result<&Participant, RoomError> {
        self.participants
            .get(participant_id)
            .ok_or_else(|| RoomError::ParticipantNotFound(participant_id.to_string()))
    }

    pub fn participant_mut(&mut self, participant_id: &str) -> Result<&mut Participant, RoomError> {
        self.participants
            .get_mut(participant_id)
            .ok_or_else(|| RoomError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Adds a not-ready participant. Lobby only.
    pub fn join(&mut self, participant_id: &str, display_name: &str) -> Result<(), RoomError> {
        self.require_phase("join", RoomPhase::Lobby)?;
        if self.participants.contains_key(participant_id) {
            return Err(RoomError::AlreadyJoined(participant_id.to_string()));
        }

        let participant =
            Participant::new(participant_id.to_string(), display_name.to_string(), self.next_seat);
        self.next_seat += 1;
        self.participants.insert(participant_id.to_string(), participant);
        Ok(())
    }

    /// Marks a participant ready. Returns false if it already was.
    pub fn mark_ready(&mut self, participant_id: &str) -> Result<bool, RoomError> {
        self.require_phase("ready", RoomPhase::Lobby)?;
        let participant = self.participant_mut(participant_id)?;
        if participant.ready {
            return Ok(false);
        }
        participant.ready = true;
        self.ready_count += 1;
        Ok(true)
    }

    pub fn remove(&mut self, participant_id: &str) -> Result<Participant, RoomError> {
        let participant = self
            .participants
            .remove(participant_id)
            .ok_or_else(|| RoomError::ParticipantNotFound(participant_id.to_string()))?;
        if participant.ready {
            self.ready_count -= 1;
        }
        Ok(participant)
    }

    /// Participants in join order
    pub fn ordered(&self) -> Vec<&Participant> {
        let mut participants: Vec<&Participant> = self.participants.values().collect();
        participants.sort_by_key(|p| p.seat);
        participants
    }

    pub fn views(&self) -> Vec<ParticipantView> {
        self.ordered().into_iter().map(Participant::view).collect()
    }

    /// Whole seconds left in an active round, rounded up
    pub fn seconds_left(&self, now: DateTime<Utc>) -> u64 {
        let Some(started_at) = self.started_at else {
            return self.duration.as_secs();
        };
        let elapsed = (now - started_at).num_milliseconds().max(0) as u128;
        let remaining = self.duration.as_millis().saturating_sub(elapsed);
        remaining.div_ceil(1000) as u64
    }
}
