use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RoundConfig;
use crate::event::{EventBus, RoomEventHandler};
use crate::room::{
    ErrorKind, HuePalette, InMemoryRoomRepository, RoomError, RoomRepository, RoomService,
    SessionContext,
};
use crate::signal::{Normalizer, SignalIngestor, SourceRegistry};
use crate::websockets::{ConnectionManager, WebSocketRoomSubscriber};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_service: Arc<RoomService>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub ingestor: SignalIngestor,
    pub sources: Arc<SourceRegistry>,
    pub normalizer: Arc<Normalizer>,
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the in-memory stores, the event bus and the WebSocket fan-out together
    pub fn new(round: RoundConfig, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        let normalizer = Arc::new(Normalizer::new());
        let sources = Arc::new(SourceRegistry::new());
        let event_bus = EventBus::new();
        let room_repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());

        let context = Arc::new(SessionContext {
            quorum: Arc::new(round.quorum),
            config: round,
            palette: Arc::new(HuePalette::default()),
            sources: sources.clone(),
            normalizer: normalizer.clone(),
            event_bus: event_bus.clone(),
            repository: room_repository.clone(),
        });
        let subscriber: Arc<dyn RoomEventHandler> =
            Arc::new(WebSocketRoomSubscriber::new(connection_manager.clone()));
        let room_service = Arc::new(RoomService::new(context, vec![subscriber]));

        Self {
            room_service,
            room_repository,
            connection_manager,
            ingestor: SignalIngestor::new(normalizer.clone(), sources.clone()),
            sources,
            normalizer,
            event_bus,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        match (&err, err.kind()) {
            (RoomError::RoomNotFound(_), _) => AppError::NotFound(err.to_string()),
            (_, ErrorKind::Validation) => AppError::BadRequest(err.to_string()),
            (_, ErrorKind::State) | (_, ErrorKind::Conflict) => {
                AppError::Conflict(err.to_string())
            }
            (_, ErrorKind::Fatal) => AppError::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::websockets::InMemoryConnectionManager;

    /// Builder for creating AppState with overrides for testing
    #[derive(Default)]
    pub struct AppStateBuilder {
        round: Option<RoundConfig>,
        connection_manager: Option<Arc<dyn ConnectionManager>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_round_config(mut self, round: RoundConfig) -> Self {
            self.round = Some(round);
            self
        }

        pub fn with_connection_manager(mut self, manager: Arc<dyn ConnectionManager>) -> Self {
            self.connection_manager = Some(manager);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.round.unwrap_or_default(),
                self.connection_manager
                    .unwrap_or_else(|| Arc::new(InMemoryConnectionManager::new())),
            )
        }
    }
}
