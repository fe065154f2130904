// Room event distribution: per-room broadcast channels and the
// subscriptions that route them to handlers.

pub use bus::EventBus;
pub use events::RoomEvent;
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

mod bus;
mod events;
mod room_handler;
mod room_subscription;
