pub mod brush;
pub mod motion;
mod scheduler;

pub use brush::Brush;
pub use scheduler::TickScheduler;
