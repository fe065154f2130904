use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::RoomResponse;
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// POST /room
/// Returns room information with generated ID
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(State(state): State<AppState>) -> Result<Json<RoomResponse>, AppError> {
    let room = state.room_service.create_room().await?;
    info!(room_id = %room.id, "Room created via HTTP");
    Ok(Json(room))
}

/// HTTP handler for listing all rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = state.room_service.list_rooms().await?;
    Ok(Json(rooms))
}

/// GET /room/:room_id
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.room_service.get_room_details(&room_id).await?;
    Ok(Json(room))
}
