use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, instrument};

use super::{errors::RoomError, repository::RoomRepository};

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long an empty lobby may linger before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(5 * 60),
            inactivity_threshold: Duration::from_secs(10 * 60),
        }
    }
}

/// Starts the background task that periodically removes abandoned rooms
#[instrument(skip(room_repository))]
pub async fn start_cleanup_task(room_repository: Arc<dyn RoomRepository>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        match cleanup_abandoned_rooms(&room_repository, config.inactivity_threshold).await {
            Ok(0) => debug!("No abandoned rooms to clean up"),
            Ok(deleted_count) => info!(deleted_count = deleted_count, "Room cleanup completed"),
            Err(e) => error!(error = %e, "Room cleanup task failed"),
        }
    }
}

/// Closes empty lobbies older than the threshold
pub async fn cleanup_abandoned_rooms(
    room_repository: &Arc<dyn RoomRepository>,
    inactivity_threshold: Duration,
) -> Result<usize, RoomError> {
    let mut deleted_count = 0;

    for session in room_repository.list_rooms().await? {
        if session.abandon_if_idle(inactivity_threshold).await {
            info!(room_id = %session.id(), "Deleted abandoned room");
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}
