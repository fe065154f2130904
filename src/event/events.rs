use serde::{Deserialize, Serialize};

use crate::room::models::{ParticipantView, Position};
use crate::room::palette::ColorPair;
use crate::tick::Brush;

/// Events that occur inside a room
///
/// Events are facts about things that already happened. Every subscriber of a
/// room sees them in the order the room emitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomEvent {
    /// The participant list, readiness or bindings changed
    PlayersChanged { players: Vec<ParticipantView> },

    /// A participant bound a signal source
    SourceSelected {
        participant_id: String,
        source: String,
    },

    /// Brush colours handed out at round start
    ColorAssigned {
        participant_id: String,
        pair: ColorPair,
    },

    /// The lobby reached quorum and the round is running
    RoundStarted { duration_ms: u64 },

    /// A participant moved during a tick
    PositionChanged {
        participant_id: String,
        old: Position,
        cur: Position,
        brush: Brush,
    },

    /// Countdown of the running round
    TimeUpdated { seconds_left: u64 },

    /// The round ended early and cannot continue
    RoundAborted { reason: String },

    /// The room closed; clients should start over
    RoundRestarted { round_token: String },
}

impl RoomEvent {
    /// Short name for logs
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::PlayersChanged { .. } => "players_changed",
            RoomEvent::SourceSelected { .. } => "source_selected",
            RoomEvent::ColorAssigned { .. } => "color_assigned",
            RoomEvent::RoundStarted { .. } => "round_started",
            RoomEvent::PositionChanged { .. } => "position_changed",
            RoomEvent::TimeUpdated { .. } => "time_updated",
            RoomEvent::RoundAborted { .. } => "round_aborted",
            RoomEvent::RoundRestarted { .. } => "round_restarted",
        }
    }
}
