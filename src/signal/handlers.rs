use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::sources::{ClaimError, SourceInfo};
use crate::shared::{AppError, AppState};

/// One batch from the signal transport
#[derive(Debug, Deserialize)]
pub struct SignalBatch {
    pub address: String,
    /// `null` marks a dropped sample
    pub values: Vec<Option<f64>>,
}

/// HTTP handler for signal ingestion
///
/// POST /signal
/// Accepts `{ "address": "muse-1/elements/alpha_absolute", "values": [..] }`
#[instrument(name = "ingest_signal", skip(state, batch), fields(address = %batch.address))]
pub async fn ingest_signal(
    State(state): State<AppState>,
    Json(batch): Json<SignalBatch>,
) -> Result<StatusCode, AppError> {
    let values: Vec<f64> = batch
        .values
        .iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect();

    state
        .ingestor
        .ingest_address(&batch.address, &values)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(StatusCode::ACCEPTED)
}

/// HTTP handler for listing registered signal sources
///
/// GET /sources
#[instrument(name = "list_sources", skip(state))]
pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceInfo>> {
    let sources = state.sources.list();
    debug!(source_count = sources.len(), "Sources listed");
    Json(sources)
}

/// HTTP handler for removing an idle signal source
///
/// DELETE /sources/:source_id
#[instrument(name = "remove_source", skip(state))]
pub async fn remove_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .ingestor
        .remove_source(&source_id)
        .map_err(|e| match e {
            ClaimError::Unknown(_) => AppError::NotFound(e.to_string()),
            ClaimError::Taken(_) => AppError::Conflict(e.to_string()),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
