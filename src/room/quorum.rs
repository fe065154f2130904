use strum_macros::{Display, EnumString};

use super::models::Room;

/// Decides when a lobby may start its round
pub trait Quorum: Send + Sync {
    fn is_met(&self, room: &Room) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum QuorumPolicy {
    /// Every participant is ready
    #[default]
    ReadyOnly,
    /// Every participant is ready and has bound a source
    ReadyAndSource,
}

impl Quorum for QuorumPolicy {
    fn is_met(&self, room: &Room) -> bool {
        let count = room.participant_count();
        if count == 0 || room.ready_count != count {
            return false;
        }
        match self {
            QuorumPolicy::ReadyOnly => true,
            QuorumPolicy::ReadyAndSource => room
                .participants
                .values()
                .all(|p| p.bound_source.is_some()),
        }
    }
}
