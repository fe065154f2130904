use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::time::{interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    errors::RoomError,
    models::{Bounds, Direction, KeyAction, Room, RoomPhase},
    palette::{assign_color_pairs, PaletteSource},
    quorum::Quorum,
    repository::RoomRepository,
    types::RoomResponse,
};
use crate::config::RoundConfig;
use crate::event::{EventBus, RoomEvent};
use crate::signal::{Normalizer, SourceClaim, SourceRegistry};
use crate::tick::TickScheduler;

/// Process-wide collaborators shared by every room session
pub struct SessionContext {
    pub config: RoundConfig,
    pub quorum: Arc<dyn Quorum>,
    pub palette: Arc<dyn PaletteSource>,
    pub sources: Arc<SourceRegistry>,
    pub normalizer: Arc<Normalizer>,
    pub event_bus: EventBus,
    pub repository: Arc<dyn RoomRepository>,
}

/// How a room came to be closed
#[derive(Debug, Clone, PartialEq)]
pub enum CloseReason {
    /// The round timer ran out
    RoundComplete,
    /// The round could not continue
    Aborted(String),
    /// The lobby emptied out or went stale; nobody is left to notify
    Abandoned,
}

/// One live room: its state, its timers and its event channel
///
/// Every mutation happens under the room lock. Timers are children of the
/// session's cancellation token and stop together when the room closes.
pub struct RoomSession {
    id: String,
    room: Arc<Mutex<Room>>,
    context: Arc<SessionContext>,
    events: broadcast::Sender<RoomEvent>,
    token: CancellationToken,
}

impl RoomSession {
    pub fn new(
        id: String,
        context: Arc<SessionContext>,
        events: broadcast::Sender<RoomEvent>,
    ) -> Self {
        let room = Room::new(id.clone(), context.config.round_duration);
        Self {
            id,
            room: Arc::new(Mutex::new(room)),
            context,
            events,
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of the current room state
    pub async fn snapshot(&self) -> Room {
        self.room.lock().await.clone()
    }

    pub async fn summary(&self) -> RoomResponse {
        RoomResponse::from(&*self.room.lock().await)
    }

    fn emit(&self, event: RoomEvent) {
        if self.events.send(event).is_err() {
            debug!(room_id = %self.id, "Room event emitted with no receivers");
        }
    }

    fn emit_players(&self, room: &Room) {
        self.emit(RoomEvent::PlayersChanged {
            players: room.views(),
        });
    }

    #[instrument(skip(self), fields(room_id = %self.id))]
    pub async fn join(&self, participant_id: &str, display_name: &str) -> Result<(), RoomError> {
        let mut room = self.room.lock().await;
        room.join(participant_id, display_name)?;

        info!(
            participant_id = %participant_id,
            participant_count = room.participant_count(),
            "Participant joined room"
        );
        self.emit_players(&room);
        Ok(())
    }

    pub async fn set_bounds(
        &self,
        participant_id: &str,
        width: f64,
        height: f64,
    ) -> Result<(), RoomError> {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(RoomError::InvalidMessage(format!(
                "Invalid bounds {width}x{height}"
            )));
        }

        let mut room = self.room.lock().await;
        room.require_open("set bounds")?;
        room.participant_mut(participant_id)?.bounds = Bounds::new(width, height);
        Ok(())
    }

    /// Binds a source exclusively, releasing the participant's previous one
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub async fn select_source(
        self: &Arc<Self>,
        participant_id: &str,
        source_id: &str,
    ) -> Result<(), RoomError> {
        let mut room = self.room.lock().await;
        room.require_phase("select a source", RoomPhase::Lobby)?;
        let previous = room.participant(participant_id)?.bound_source.clone();

        let claim = SourceClaim {
            room_id: self.id.clone(),
            participant_id: participant_id.to_string(),
        };
        self.context.sources.claim(source_id, claim.clone())?;
        if let Some(previous) = previous.filter(|p| p != source_id) {
            self.context.sources.release(&previous, &claim);
        }
        room.participant_mut(participant_id)?.bound_source = Some(source_id.to_string());

        info!(participant_id = %participant_id, source_id = %source_id, "Source selected");
        self.emit(RoomEvent::SourceSelected {
            participant_id: participant_id.to_string(),
            source: source_id.to_string(),
        });
        self.emit_players(&room);

        self.start_if_quorum(&mut room);
        Ok(())
    }

    #[instrument(skip(self), fields(room_id = %self.id))]
    pub async fn mark_ready(self: &Arc<Self>, participant_id: &str) -> Result<(), RoomError> {
        let mut room = self.room.lock().await;
        if !room.mark_ready(participant_id)? {
            debug!(participant_id = %participant_id, "Participant already ready");
            return Ok(());
        }

        info!(
            participant_id = %participant_id,
            ready_count = room.ready_count,
            participant_count = room.participant_count(),
            "Participant ready"
        );
        self.emit_players(&room);

        self.start_if_quorum(&mut room);
        Ok(())
    }

    /// Records a key transition. Unknown key codes and closed rooms are ignored.
    pub async fn key(
        &self,
        participant_id: &str,
        code: &str,
        action: KeyAction,
    ) -> Result<(), RoomError> {
        let mut room = self.room.lock().await;
        if room.phase == RoomPhase::Closed {
            return Ok(());
        }

        let participant = room.participant_mut(participant_id)?;
        let Some(direction) = Direction::from_key_code(code) else {
            return Ok(());
        };
        match action {
            KeyAction::Down => participant.held_keys.insert(direction),
            KeyAction::Up => participant.held_keys.remove(&direction),
        };
        Ok(())
    }

    /// Removes a participant. Losing a ready participant mid-round aborts the round.
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub async fn disconnect(self: &Arc<Self>, participant_id: &str) -> Result<(), RoomError> {
        let mut room = self.room.lock().await;
        if room.phase == RoomPhase::Closed {
            return Ok(());
        }

        let participant = room.remove(participant_id)?;
        let claim = SourceClaim {
            room_id: self.id.clone(),
            participant_id: participant.id.clone(),
        };
        if let Some(source) = &participant.bound_source {
            self.context.sources.release(source, &claim);
        }

        info!(
            participant_id = %participant_id,
            phase = %room.phase,
            remaining = room.participant_count(),
            "Participant left room"
        );

        let phase = room.phase;
        match phase {
            RoomPhase::Active if participant.ready => {
                let reason = format!("{} left during the round", participant.display_name);
                self.close_locked(room, CloseReason::Aborted(reason)).await;
            }
            _ if room.is_empty() => {
                self.close_locked(room, CloseReason::Abandoned).await;
            }
            RoomPhase::Lobby => {
                self.emit_players(&room);
                self.start_if_quorum(&mut room);
            }
            _ => self.emit_players(&room),
        }
        Ok(())
    }

    pub async fn close(&self, reason: CloseReason) {
        let room = self.room.lock().await;
        self.close_locked(room, reason).await;
    }

    /// Closes an empty lobby that has existed longer than `threshold`
    pub async fn abandon_if_idle(&self, threshold: Duration) -> bool {
        let room = self.room.lock().await;
        let age = (Utc::now() - room.created_at).to_std().unwrap_or_default();
        if room.phase != RoomPhase::Lobby || !room.is_empty() || age < threshold {
            return false;
        }
        self.close_locked(room, CloseReason::Abandoned).await;
        true
    }

    async fn close_locked(&self, mut room: MutexGuard<'_, Room>, reason: CloseReason) {
        if room.phase == RoomPhase::Closed {
            return;
        }

        room.phase = RoomPhase::Closed;
        self.token.cancel();
        self.context.sources.release_room(&self.id);
        for participant in room.participants.values_mut() {
            participant.bound_source = None;
            participant.held_keys.clear();
        }
        if let CloseReason::Aborted(message) = &reason {
            warn!(room_id = %self.id, reason = %message, "Round aborted");
            self.emit(RoomEvent::RoundAborted {
                reason: message.clone(),
            });
        }
        drop(room);

        self.context.event_bus.remove_room(&self.id).await;
        if let Err(e) = self.context.repository.delete_room(&self.id).await {
            debug!(room_id = %self.id, error = %e, "Room record already gone");
        }

        if reason != CloseReason::Abandoned {
            let round_token = Uuid::new_v4().to_string();
            info!(room_id = %self.id, round_token = %round_token, "Room closed, restarting");
            self.emit(RoomEvent::RoundRestarted { round_token });
        } else {
            info!(room_id = %self.id, "Abandoned room closed");
        }
    }

    fn start_if_quorum(self: &Arc<Self>, room: &mut Room) {
        if room.phase == RoomPhase::Lobby && self.context.quorum.is_met(room) {
            self.start_round(room);
        }
    }

    fn start_round(self: &Arc<Self>, room: &mut Room) {
        room.phase = RoomPhase::Active;
        room.started_at = Some(Utc::now());

        let ids: Vec<String> = room.ordered().iter().map(|p| p.id.clone()).collect();
        let mut pairs = assign_color_pairs(&ids, self.context.palette.as_ref(), &mut rand::rng());
        for participant in room.participants.values_mut() {
            participant.colors = pairs.get(&participant.id).copied();
            participant.position = participant.bounds.centre();
        }

        info!(
            room_id = %self.id,
            participant_count = ids.len(),
            duration_ms = room.duration.as_millis() as u64,
            "Round started"
        );

        for id in ids {
            if let Some(pair) = pairs.remove(&id) {
                self.emit(RoomEvent::ColorAssigned {
                    participant_id: id,
                    pair,
                });
            }
        }
        self.emit(RoomEvent::RoundStarted {
            duration_ms: room.duration.as_millis() as u64,
        });

        TickScheduler::new(
            self.id.clone(),
            self.room.clone(),
            self.context.normalizer.clone(),
            self.context.config.clone(),
            self.events.clone(),
            self.token.child_token(),
        )
        .spawn();
        self.spawn_countdown();
        self.spawn_round_timer(room.duration);
    }

    fn spawn_countdown(&self) {
        let room = self.room.clone();
        let events = self.events.clone();
        let token = self.token.child_token();
        let mut ticker = interval(self.context.config.countdown_interval);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let room = room.lock().await;
                if token.is_cancelled() || room.phase != RoomPhase::Active {
                    break;
                }
                let seconds_left = room.seconds_left(Utc::now());
                let _ = events.send(RoomEvent::TimeUpdated { seconds_left });
                if seconds_left == 0 {
                    break;
                }
            }
        });
    }

    fn spawn_round_timer(self: &Arc<Self>, duration: Duration) {
        let session = self.clone();
        let token = self.token.child_token();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = sleep(duration) => session.close(CloseReason::RoundComplete).await,
            }
        });
    }
}
