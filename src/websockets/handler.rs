use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::room::{RoomError, RoomService};
use crate::shared::{AppError, AppState};

use super::{
    connection_manager::ConnectionManager,
    messages::{ClientCommand, WebSocketMessage},
    socket::{Connection, MessageHandler},
};

/// Message handler for receiving WebSocket messages from the client
///
/// Requests are applied to the room; rejections go back to the sender only.
pub struct WebsocketReceiveHandler {
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
    /// Name used when a `join` carries none
    default_name: String,
}

impl WebsocketReceiveHandler {
    pub fn new(
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
        default_name: String,
    ) -> Self {
        Self {
            room_service,
            connection_manager,
            default_name,
        }
    }

    async fn apply(
        &self,
        participant_id: &str,
        room_id: &str,
        command: ClientCommand,
    ) -> Result<(), RoomError> {
        let rooms = &self.room_service;
        match command {
            ClientCommand::Join { name } => {
                let name = name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| self.default_name.clone());
                rooms.join(room_id, participant_id, &name).await
            }
            ClientCommand::Bounds { width, height } => {
                rooms
                    .set_bounds(room_id, participant_id, width, height)
                    .await
            }
            ClientCommand::SelectSource { id } => {
                rooms.select_source(room_id, participant_id, &id).await
            }
            ClientCommand::Ready => rooms.mark_ready(room_id, participant_id).await,
            ClientCommand::Key { code, action } => {
                rooms.key(room_id, participant_id, &code, action).await
            }
            ClientCommand::Disconnect => rooms.disconnect(room_id, participant_id).await,
        }
    }

    async fn send_error(&self, participant_id: &str, error: &RoomError) {
        match WebSocketMessage::error(error.to_string()).to_json() {
            Ok(json) => {
                self.connection_manager
                    .send_to_player(participant_id, &json)
                    .await
            }
            Err(e) => warn!(error = %e, "Failed to serialize error message"),
        }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, participant_id: &str, room_id: &str, message: String) {
        debug!(
            participant_id = %participant_id,
            room_id = %room_id,
            message = %message,
            "Received message"
        );

        let result = match ClientCommand::parse(&message) {
            Ok(command) => self.apply(participant_id, room_id, command).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            info!(
                participant_id = %participant_id,
                room_id = %room_id,
                error = %e,
                kind = ?e.kind(),
                "Rejected client message"
            );
            self.send_error(participant_id, &e).await;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub name: Option<String>,
}

/// WebSocket endpoint for a room
/// GET /ws/:room_id?name=...
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(params): Query<ConnectParams>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    info!(room_id = %room_id, "WebSocket connection requested");

    // Rooms come into existence on first connection
    app_state.room_service.get_or_create_room(&room_id).await?;

    let participant_id = Uuid::new_v4().to_string();
    let default_name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| petname::Petnames::default().generate_one(2, " "));

    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(socket, room_id, participant_id, default_name, app_state)
    }))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    room_id: String,
    participant_id: String,
    default_name: String,
    app_state: AppState,
) {
    info!(
        room_id = %room_id,
        participant_id = %participant_id,
        "WebSocket connection established"
    );

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(participant_id.clone(), room_id.clone(), outbound_sender.clone())
        .await;

    // Initial room state, tagged with the id the client was given
    if let Ok(session) = app_state.room_service.get_room(&room_id).await {
        let initial_message = WebSocketMessage::players(session.snapshot().await.views())
            .for_participant(&participant_id);
        if let Ok(message_json) = initial_message.to_json() {
            let _ = outbound_sender.send(message_json);
        }
    }

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.room_service.clone(),
        app_state.connection_manager.clone(),
        default_name,
    ));

    let connection = Connection::new(
        participant_id.clone(),
        room_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => info!(
            room_id = %room_id,
            participant_id = %participant_id,
            "WebSocket connection closed cleanly"
        ),
        Err(e) => warn!(
            room_id = %room_id,
            participant_id = %participant_id,
            error = %e,
            "WebSocket connection error"
        ),
    }

    app_state
        .connection_manager
        .remove_connection(&participant_id)
        .await;

    // A socket that never joined, or a room that already closed, has nothing to undo
    match app_state
        .room_service
        .disconnect(&room_id, &participant_id)
        .await
    {
        Ok(()) => {}
        Err(RoomError::ParticipantNotFound(_)) | Err(RoomError::RoomNotFound(_)) => {}
        Err(e) => warn!(
            room_id = %room_id,
            participant_id = %participant_id,
            error = %e,
            "Disconnect after socket close failed"
        ),
    }
}
