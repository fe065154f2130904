use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use brainaim::{
    room::QuorumPolicy,
    websockets::{ConnectionManager, WebsocketReceiveHandler},
    AppState, RoundConfig,
};

use super::mocks::MockConnectionManager;

pub const ROOM_ID: &str = "room-123";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    /// One receive handler per connected participant, as the socket layer creates them
    pub input_handlers: HashMap<String, WebsocketReceiveHandler>,
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    round: RoundConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            round: RoundConfig {
                tick_period: Duration::from_millis(10),
                round_duration: Duration::from_millis(300),
                countdown_interval: Duration::from_millis(100),
                ..RoundConfig::default()
            },
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_one_player(self) -> Self {
        self.with_players(vec!["alice"])
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_five_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david", "erin"])
    }

    pub fn with_quorum(mut self, quorum: QuorumPolicy) -> Self {
        self.round.quorum = quorum;
        self
    }

    pub fn with_round_duration(mut self, duration: Duration) -> Self {
        self.round.round_duration = duration;
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let state = AppState::new(self.round, mock_conn_manager.clone());

        state
            .room_service
            .get_or_create_room(ROOM_ID)
            .await
            .unwrap();

        let mut input_handlers = HashMap::new();
        for player in &self.players {
            let (sender, _) = tokio::sync::mpsc::unbounded_channel();
            mock_conn_manager
                .add_connection(player.clone(), ROOM_ID.to_string(), sender)
                .await;
            input_handlers.insert(
                player.clone(),
                WebsocketReceiveHandler::new(
                    state.room_service.clone(),
                    mock_conn_manager.clone(),
                    format!("{player}-default"),
                ),
            );
        }

        TestSetup {
            state,
            mock_conn_manager,
            input_handlers,
            players: self.players,
        }
    }
}
