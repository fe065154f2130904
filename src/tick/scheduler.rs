use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{brush, motion};
use crate::config::RoundConfig;
use crate::event::RoomEvent;
use crate::room::models::{Position, Room, RoomPhase};
use crate::signal::Normalizer;

/// Fixed-rate motion loop of one active room
pub struct TickScheduler {
    room_id: String,
    room: Arc<Mutex<Room>>,
    normalizer: Arc<Normalizer>,
    config: RoundConfig,
    events: broadcast::Sender<RoomEvent>,
    token: CancellationToken,
    rng: StdRng,
    /// Last drawn (jittered) point per participant
    last_drawn: HashMap<String, Position>,
}

impl TickScheduler {
    pub fn new(
        room_id: String,
        room: Arc<Mutex<Room>>,
        normalizer: Arc<Normalizer>,
        config: RoundConfig,
        events: broadcast::Sender<RoomEvent>,
        token: CancellationToken,
    ) -> Self {
        Self {
            room_id,
            room,
            normalizer,
            config,
            events,
            token,
            rng: StdRng::from_rng(&mut rand::rng()),
            last_drawn: HashMap::new(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(
            room_id = %self.room_id,
            period_ms = self.config.tick_period.as_millis() as u64,
            "Tick scheduler started"
        );

        let mut ticker = interval(self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let room = Arc::clone(&self.room);
            let mut room = room.lock().await;
            if self.token.is_cancelled() || room.phase != RoomPhase::Active {
                break;
            }

            // Sent under the lock so nothing from this tick trails a close
            for event in self.evaluate(&mut room) {
                let _ = self.events.send(event);
            }
        }

        debug!(room_id = %self.room_id, "Tick scheduler stopped");
    }

    /// Advances every participant by one tick and returns the resulting events
    pub fn evaluate(&mut self, room: &mut Room) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        for participant in room.participants.values_mut() {
            let next = motion::step(
                participant.position,
                &participant.held_keys,
                participant.bounds,
                self.config.movement_magnitude,
            );
            if next == participant.position {
                continue;
            }

            let previous = participant.position;
            participant.position = next;

            let percentage = |band| {
                participant
                    .bound_source
                    .as_deref()
                    .and_then(|source| self.normalizer.percentage(source, band))
            };
            let calm = percentage(self.config.jitter_band);
            let focus = percentage(self.config.brush_band);

            let cur = brush::jitter(next, calm, self.config.noise_factor, &mut self.rng);
            let old = self
                .last_drawn
                .insert(participant.id.clone(), cur)
                .unwrap_or(previous);

            let Some(colors) = participant.colors else {
                continue;
            };

            events.push(RoomEvent::PositionChanged {
                participant_id: participant.id.clone(),
                old,
                cur,
                brush: brush::brush(&colors, focus, self.config.brush_size),
            });
        }

        events
    }
}
