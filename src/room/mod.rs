// Public API - what other modules can use
pub use errors::{ErrorKind, RoomError};
pub use handlers::{create_room, get_room, list_rooms};
pub use models::{Direction, KeyAction, ParticipantView, Position, Room, RoomPhase};
pub use palette::{ColorPair, HuePalette, PaletteSource, Rgb};
pub use quorum::{Quorum, QuorumPolicy};
pub use repository::{InMemoryRoomRepository, RoomRepository};
pub use service::RoomService;
pub use session::{CloseReason, RoomSession, SessionContext};
pub use types::RoomResponse;

pub mod cleanup_task;
mod errors;
mod handlers;
pub mod models;
pub mod palette;
mod quorum;
pub mod repository;
mod service;
mod session;
mod types;
