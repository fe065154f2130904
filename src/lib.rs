// Library crate for the brainaim server
// This file exposes the public API for integration tests

pub mod config;
pub mod device;
pub mod event;
pub mod room;
pub mod shared;
pub mod signal;
pub mod tick;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{RoundConfig, ServerConfig};
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use room::{RoomError, RoomPhase, RoomService};
pub use shared::{AppError, AppState};
pub use signal::{Band, Normalizer, SignalIngestor, SourceRegistry};
pub use websockets::{
    ConnectionManager, MessageHandler, MessageType, WebSocketMessage, WebSocketRoomSubscriber,
    WebsocketReceiveHandler,
};
