use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::RoomEvent;
use crate::room::{ColorPair, KeyAction, ParticipantView, Position, RoomError};
use crate::tick::Brush;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    // Client -> Server
    Join,
    Bounds,
    SelectSource,
    Ready,
    Key,
    Disconnect,

    // Server -> Client
    Players,
    PlayerSelected,
    Color,
    Start,
    Position,
    UpdateTime,
    Restart,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub participant_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinPayload {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsPayload {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectSourcePayload {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPayload {
    pub code: String,
    #[serde(rename = "type")]
    pub action: KeyAction,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersPayload {
    pub players: Vec<ParticipantView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSelectedPayload {
    pub id: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorPayload {
    pub id: String,
    pub pair: ColorPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPayload {
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPayload {
    pub id: String,
    pub old: Position,
    pub cur: Position,
    pub brush: Brush,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTimePayload {
    pub seconds_left: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartPayload {
    pub round_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// A parsed client request
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Join { name: Option<String> },
    Bounds { width: f64, height: f64 },
    SelectSource { id: String },
    Ready,
    Key { code: String, action: KeyAction },
    Disconnect,
}

impl ClientCommand {
    /// Parses raw client text into a command
    pub fn parse(raw: &str) -> Result<Self, RoomError> {
        let message: WebSocketMessage =
            serde_json::from_str(raw).map_err(|e| RoomError::InvalidMessage(e.to_string()))?;
        Self::try_from(message)
    }
}

fn payload<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, RoomError> {
    serde_json::from_value(value).map_err(|e| RoomError::InvalidMessage(e.to_string()))
}

impl TryFrom<WebSocketMessage> for ClientCommand {
    type Error = RoomError;

    fn try_from(message: WebSocketMessage) -> Result<Self, Self::Error> {
        match message.message_type {
            MessageType::Join => {
                let join: JoinPayload = if message.payload.is_null() {
                    JoinPayload::default()
                } else {
                    payload(message.payload)?
                };
                Ok(ClientCommand::Join { name: join.name })
            }
            MessageType::Bounds => {
                let bounds: BoundsPayload = payload(message.payload)?;
                Ok(ClientCommand::Bounds {
                    width: bounds.width,
                    height: bounds.height,
                })
            }
            MessageType::SelectSource => {
                let select: SelectSourcePayload = payload(message.payload)?;
                Ok(ClientCommand::SelectSource { id: select.id })
            }
            MessageType::Ready => Ok(ClientCommand::Ready),
            MessageType::Key => {
                let key: KeyPayload = payload(message.payload)?;
                Ok(ClientCommand::Key {
                    code: key.code,
                    action: key.action,
                })
            }
            MessageType::Disconnect => Ok(ClientCommand::Disconnect),
            other => Err(RoomError::InvalidMessage(format!(
                "{other:?} is not a client message"
            ))),
        }
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                participant_id: None,
            }),
        }
    }

    fn with_payload<T: Serialize>(message_type: MessageType, payload: T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Tags the message with the participant it is addressed to
    pub fn for_participant(mut self, participant_id: &str) -> Self {
        if let Some(meta) = self.meta.as_mut() {
            meta.participant_id = Some(participant_id.to_string());
        }
        self
    }

    pub fn players(players: Vec<ParticipantView>) -> Self {
        Self::with_payload(MessageType::Players, PlayersPayload { players })
    }

    pub fn player_selected(id: String, source: String) -> Self {
        Self::with_payload(
            MessageType::PlayerSelected,
            PlayerSelectedPayload { id, source },
        )
    }

    pub fn color(id: String, pair: ColorPair) -> Self {
        Self::with_payload(MessageType::Color, ColorPayload { id, pair })
    }

    pub fn start(duration_ms: u64) -> Self {
        Self::with_payload(MessageType::Start, StartPayload { duration_ms })
    }

    pub fn position(id: String, old: Position, cur: Position, brush: Brush) -> Self {
        Self::with_payload(
            MessageType::Position,
            PositionPayload {
                id,
                old,
                cur,
                brush,
            },
        )
    }

    pub fn update_time(seconds_left: u64) -> Self {
        Self::with_payload(MessageType::UpdateTime, UpdateTimePayload { seconds_left })
    }

    pub fn restart(round_token: String) -> Self {
        Self::with_payload(MessageType::Restart, RestartPayload { round_token })
    }

    pub fn error(message: String) -> Self {
        Self::with_payload(MessageType::Error, ErrorPayload { message })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<RoomEvent> for WebSocketMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::PlayersChanged { players } => Self::players(players),
            RoomEvent::SourceSelected {
                participant_id,
                source,
            } => Self::player_selected(participant_id, source),
            RoomEvent::ColorAssigned {
                participant_id,
                pair,
            } => Self::color(participant_id, pair),
            RoomEvent::RoundStarted { duration_ms } => Self::start(duration_ms),
            RoomEvent::PositionChanged {
                participant_id,
                old,
                cur,
                brush,
            } => Self::position(participant_id, old, cur, brush),
            RoomEvent::TimeUpdated { seconds_left } => Self::update_time(seconds_left),
            RoomEvent::RoundAborted { reason } => {
                Self::error(RoomError::RoundAborted(reason).to_string())
            }
            RoomEvent::RoundRestarted { round_token } => Self::restart(round_token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Rgb;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"type": "join", "payload": {"name": "Alice"}}"#, ClientCommand::Join { name: Some("Alice".into()) })]
    #[case(r#"{"type": "join"}"#, ClientCommand::Join { name: None })]
    #[case(r#"{"type": "bounds", "payload": {"width": 640, "height": 480}}"#, ClientCommand::Bounds { width: 640.0, height: 480.0 })]
    #[case(r#"{"type": "select-source", "payload": {"id": "muse-1"}}"#, ClientCommand::SelectSource { id: "muse-1".into() })]
    #[case(r#"{"type": "ready", "payload": {}}"#, ClientCommand::Ready)]
    #[case(r#"{"type": "key", "payload": {"code": "ArrowUp", "type": "keydown"}}"#, ClientCommand::Key { code: "ArrowUp".into(), action: KeyAction::Down })]
    #[case(r#"{"type": "key", "payload": {"code": "KeyA", "type": "keyup"}}"#, ClientCommand::Key { code: "KeyA".into(), action: KeyAction::Up })]
    #[case(r#"{"type": "disconnect"}"#, ClientCommand::Disconnect)]
    fn test_parse_client_commands(#[case] raw: &str, #[case] expected: ClientCommand) {
        assert_eq!(ClientCommand::parse(raw), Ok(expected));
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"type": "fly"}"#)]
    #[case(r#"{"type": "bounds", "payload": {"width": "wide"}}"#)]
    #[case(r#"{"type": "key", "payload": {"code": "ArrowUp", "type": "keypress"}}"#)]
    #[case(r#"{"type": "restart", "payload": {"round_token": "t"}}"#)]
    fn test_parse_rejects_invalid_messages(#[case] raw: &str) {
        assert!(matches!(
            ClientCommand::parse(raw),
            Err(RoomError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_position_message_shape() {
        let message: WebSocketMessage = RoomEvent::PositionChanged {
            participant_id: "p1".to_string(),
            old: Position::new(1.0, 2.0),
            cur: Position::new(3.0, 4.0),
            brush: Brush {
                color: Rgb::new(255, 0, 0),
                size: 45.0,
            },
        }
        .into();

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "position");
        assert_eq!(
            value["payload"],
            json!({
                "id": "p1",
                "old": {"x": 1.0, "y": 2.0},
                "cur": {"x": 3.0, "y": 4.0},
                "brush": {"color": "#ff0000", "size": 45.0}
            })
        );
    }

    #[test]
    fn test_event_message_types() {
        let cases = [
            (RoomEvent::PlayersChanged { players: vec![] }, "players"),
            (
                RoomEvent::SourceSelected {
                    participant_id: "p".into(),
                    source: "s".into(),
                },
                "player-selected",
            ),
            (RoomEvent::RoundStarted { duration_ms: 1 }, "start"),
            (RoomEvent::TimeUpdated { seconds_left: 1 }, "update-time"),
            (RoomEvent::RoundAborted { reason: "r".into() }, "error"),
            (
                RoomEvent::RoundRestarted {
                    round_token: "t".into(),
                },
                "restart",
            ),
        ];

        for (event, expected) in cases {
            let value = serde_json::to_value(WebSocketMessage::from(event)).unwrap();
            assert_eq!(value["type"], expected);
        }
    }

    #[test]
    fn test_for_participant_sets_meta() {
        let message = WebSocketMessage::players(vec![]).for_participant("p1");
        assert_eq!(
            message.meta.and_then(|m| m.participant_id),
            Some("p1".to_string())
        );
    }
}
