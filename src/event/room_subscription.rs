use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, room_handler::RoomEventHandler};

/// Manages room event subscriptions and routes events to handlers
pub struct RoomSubscription {
    room_id: String,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_id: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            room_id,
            handler,
            event_bus,
        }
    }

    /// Start the subscription - spawns a background task that listens to room events
    /// and routes them to the handler
    pub async fn start(self) -> JoinHandle<()> {
        let room_id = self.room_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            room_id = %room_id,
            handler = handler_name,
            "Starting room subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_room(&room_id).await;

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            room_id = %room_id,
                            handler = handler_name,
                            skipped = skipped,
                            "Room subscription lagged, skipping events"
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    room_id = %room_id,
                    handler = handler_name,
                    event = event.event_type(),
                    "Received room event"
                );

                if let Err(e) = self.handler.handle_room_event(&room_id, event).await {
                    warn!(
                        room_id = %room_id,
                        handler = handler_name,
                        error = %e,
                        "Room event handler failed"
                    );
                }
            }

            info!(
                room_id = %room_id,
                handler = handler_name,
                "Room subscription ended - no more events"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RoomEvent, RoomEventError};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<RoomEvent>>,
    }

    #[async_trait]
    impl RoomEventHandler for RecordingHandler {
        async fn handle_room_event(
            &self,
            _room_id: &str,
            event: RoomEvent,
        ) -> Result<(), RoomEventError> {
            // Slow enough for the sender to overrun the channel
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.seen.lock().await.push(event);
            Ok(())
        }

        fn handler_name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_lagging_subscription_keeps_running() {
        let bus = EventBus::new();
        let handler = Arc::new(RecordingHandler::default());
        let sender = bus.sender_for_room("room").await;
        let task = RoomSubscription::new("room".to_string(), handler.clone(), bus.clone())
            .start()
            .await;

        for seconds_left in 0..5_000 {
            let _ = sender.send(RoomEvent::TimeUpdated { seconds_left });
        }
        let _ = sender.send(RoomEvent::RoundRestarted {
            round_token: "last".to_string(),
        });

        bus.remove_room("room").await;
        drop(sender);
        task.await.unwrap();

        let seen = handler.seen.lock().await;
        assert!(seen.len() < 5_001);
        assert_eq!(
            seen.last(),
            Some(&RoomEvent::RoundRestarted {
                round_token: "last".to_string()
            })
        );
    }
}
