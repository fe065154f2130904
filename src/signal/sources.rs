use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Who currently holds a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceClaim {
    pub room_id: String,
    pub participant_id: String,
}

/// Listing entry for a registered source
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub id: String,
    pub claimed_by: Option<SourceClaim>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClaimError {
    #[error("Source {0} is not registered")]
    Unknown(String),

    #[error("Source {0} is already claimed")]
    Taken(String),
}

/// Registry of known signal sources and their exclusive claims
///
/// A claim is checked and written under one lock, so two concurrent claims of
/// the same source can never both succeed.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Mutex<HashMap<String, Option<SourceClaim>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source, returning true on first sighting
    pub fn register(&self, source_id: &str) -> bool {
        let mut sources = self.sources.lock();
        if sources.contains_key(source_id) {
            return false;
        }
        sources.insert(source_id.to_string(), None);
        info!(source_id = %source_id, "Registered signal source");
        true
    }

    /// Forgets a source. A claimed source stays registered.
    pub fn unregister(&self, source_id: &str) -> Result<(), ClaimError> {
        let mut sources = self.sources.lock();
        match sources.get(source_id) {
            None => Err(ClaimError::Unknown(source_id.to_string())),
            Some(Some(_)) => Err(ClaimError::Taken(source_id.to_string())),
            Some(None) => {
                sources.remove(source_id);
                info!(source_id = %source_id, "Unregistered signal source");
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, source_id: &str) -> bool {
        self.sources.lock().contains_key(source_id)
    }

    /// Claims a source for a participant. Re-claiming one's own source succeeds.
    pub fn claim(&self, source_id: &str, claim: SourceClaim) -> Result<(), ClaimError> {
        let mut sources = self.sources.lock();
        let slot = sources
            .get_mut(source_id)
            .ok_or_else(|| ClaimError::Unknown(source_id.to_string()))?;

        match slot.as_ref() {
            Some(existing) if *existing == claim => Ok(()),
            Some(existing) => {
                debug!(
                    source_id = %source_id,
                    holder = %existing.participant_id,
                    contender = %claim.participant_id,
                    "Source claim rejected"
                );
                Err(ClaimError::Taken(source_id.to_string()))
            }
            None => {
                debug!(
                    source_id = %source_id,
                    room_id = %claim.room_id,
                    participant_id = %claim.participant_id,
                    "Source claimed"
                );
                *slot = Some(claim);
                Ok(())
            }
        }
    }

    /// Releases a source if it is held by the given claim
    pub fn release(&self, source_id: &str, claim: &SourceClaim) {
        let mut sources = self.sources.lock();
        if let Some(slot) = sources.get_mut(source_id) {
            if slot.as_ref() == Some(claim) {
                *slot = None;
                debug!(source_id = %source_id, "Source released");
            }
        }
    }

    /// Releases every source claimed inside a room
    pub fn release_room(&self, room_id: &str) {
        let mut sources = self.sources.lock();
        for slot in sources.values_mut() {
            if slot.as_ref().is_some_and(|c| c.room_id == room_id) {
                *slot = None;
            }
        }
    }

    pub fn holder(&self, source_id: &str) -> Option<SourceClaim> {
        self.sources.lock().get(source_id).cloned().flatten()
    }

    pub fn list(&self) -> Vec<SourceInfo> {
        let mut list: Vec<SourceInfo> = self
            .sources
            .lock()
            .iter()
            .map(|(id, claim)| SourceInfo {
                id: id.clone(),
                claimed_by: claim.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn claim(room: &str, participant: &str) -> SourceClaim {
        SourceClaim {
            room_id: room.to_string(),
            participant_id: participant.to_string(),
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = SourceRegistry::new();
        assert!(registry.register("muse-1"));
        assert!(!registry.register("muse-1"));
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_claim_unknown_source() {
        let registry = SourceRegistry::new();
        assert_eq!(
            registry.claim("ghost", claim("r", "alice")),
            Err(ClaimError::Unknown("ghost".to_string()))
        );
    }

    #[test]
    fn test_claim_is_exclusive_until_released() {
        let registry = SourceRegistry::new();
        registry.register("muse-1");

        assert!(registry.claim("muse-1", claim("r", "alice")).is_ok());
        assert!(registry.claim("muse-1", claim("r", "alice")).is_ok());
        assert_eq!(
            registry.claim("muse-1", claim("r", "bob")),
            Err(ClaimError::Taken("muse-1".to_string()))
        );

        // Only the holder can release
        registry.release("muse-1", &claim("r", "bob"));
        assert_eq!(registry.holder("muse-1"), Some(claim("r", "alice")));

        registry.release("muse-1", &claim("r", "alice"));
        assert!(registry.claim("muse-1", claim("r", "bob")).is_ok());
    }

    #[test]
    fn test_release_room_frees_only_that_room() {
        let registry = SourceRegistry::new();
        registry.register("a");
        registry.register("b");
        registry.claim("a", claim("room-1", "alice")).unwrap();
        registry.claim("b", claim("room-2", "bob")).unwrap();

        registry.release_room("room-1");

        assert_eq!(registry.holder("a"), None);
        assert_eq!(registry.holder("b"), Some(claim("room-2", "bob")));
    }

    #[test]
    fn test_unregister_refuses_claimed_source() {
        let registry = SourceRegistry::new();
        registry.register("muse-1");
        registry.claim("muse-1", claim("r", "alice")).unwrap();

        assert_eq!(
            registry.unregister("muse-1"),
            Err(ClaimError::Taken("muse-1".to_string()))
        );

        registry.release_room("r");
        assert!(registry.unregister("muse-1").is_ok());
        assert!(!registry.is_registered("muse-1"));
        assert_eq!(
            registry.unregister("muse-1"),
            Err(ClaimError::Unknown("muse-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(SourceRegistry::new());
        registry.register("muse-1");

        let handles = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry.claim("muse-1", claim("r", &format!("player-{}", i)))
                })
            })
            .collect::<Vec<_>>();

        let results = futures::future::join_all(handles).await;
        let winners = results.into_iter().filter(|r| r.as_ref().unwrap().is_ok()).count();
        assert_eq!(winners, 1);
    }
}
