//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use brainaim::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(|s| s.as_str()).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    /// Assert every player received exactly one message of this type, with equal payloads
    pub async fn received_once(self, expected_type: MessageType) -> MessageContent {
        let mut payloads = vec![];

        for player in &self.players {
            let messages = messages_of_type(self.setup, player, expected_type).await;
            assert_eq!(
                messages.len(),
                1,
                "{} should have received exactly one {:?}",
                player,
                expected_type
            );
            payloads.push(messages[0].payload.clone());
        }

        for (i, payload) in payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &payloads[0],
                "Player {} payload differs from player {}",
                self.players[i], self.players[0]
            );
        }

        MessageContent {
            payload: payloads.swap_remove(0),
        }
    }

    /// Assert players received at least one message of this type
    pub async fn received_message_type(self, expected_type: MessageType) -> Vec<MessageContent> {
        let mut contents = vec![];
        for player in &self.players {
            let messages = messages_of_type(self.setup, player, expected_type).await;
            assert!(
                !messages.is_empty(),
                "{} should have received {:?}",
                player,
                expected_type
            );
            if player == &self.players[0] {
                contents = messages
                    .into_iter()
                    .map(|m| MessageContent { payload: m.payload })
                    .collect();
            }
        }
        contents
    }

    /// Assert players received no message of this type
    pub async fn did_not_receive(self, unexpected_type: MessageType) {
        for player in &self.players {
            let messages = messages_of_type(self.setup, player, unexpected_type).await;
            assert!(
                messages.is_empty(),
                "{} should not have received {:?}",
                player,
                unexpected_type
            );
        }
    }

    /// Assert that players received no messages at all
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.setup.mock_conn_manager.get_messages_for(player).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages",
                player
            );
        }
    }
}

/// All recorded messages of one type for a player, in arrival order (non-consuming)
pub async fn messages_of_type(
    setup: &TestSetup,
    player: &str,
    msg_type: MessageType,
) -> Vec<WebSocketMessage> {
    setup
        .mock_conn_manager
        .get_messages_for(player)
        .await
        .iter()
        .map(|raw| serde_json::from_str::<WebSocketMessage>(raw).unwrap())
        .filter(|msg| msg.message_type == msg_type)
        .collect()
}

/// Type of the last message a player received
pub async fn last_message_type(setup: &TestSetup, player: &str) -> Option<MessageType> {
    setup
        .mock_conn_manager
        .get_messages_for(player)
        .await
        .last()
        .map(|raw| serde_json::from_str::<WebSocketMessage>(raw).unwrap().message_type)
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: serde_json::Value,
}

impl MessageContent {
    pub fn with_field(self, field: &str, expected: serde_json::Value) -> Self {
        assert_eq!(self.payload[field], expected, "unexpected {field}");
        self
    }

    pub fn with_error_containing(self, fragment: &str) -> Self {
        let message = self.payload["message"].as_str().unwrap_or_default();
        assert!(
            message.contains(fragment),
            "error {message:?} should mention {fragment:?}"
        );
        self
    }

    /// Names in the players list, in join order
    pub fn player_names(&self) -> Vec<String> {
        self.payload["players"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    }
}
