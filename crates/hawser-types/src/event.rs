use serde::{Deserialize, Serialize};

use crate::reference::ContentReference;

/// A content-reference event delivered by the ledger.
///
/// Events are append-only. `removed: true` marks a chain reorganization
/// retracting a previously delivered event; retractions are recorded in the
/// logs and never trigger compensating deletions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Block height the event was recorded at.
    pub block_number: u64,
    /// The content reference carried by the event.
    pub reference: ContentReference,
    /// Set when a reorganization retracted this event.
    #[serde(default)]
    pub removed: bool,
}

impl ChainEvent {
    /// A live (non-retracted) event at the given block.
    pub fn new(block_number: u64, reference: ContentReference) -> Self {
        Self {
            block_number,
            reference,
            removed: false,
        }
    }

    /// A retraction of a previously delivered event.
    pub fn retraction(block_number: u64, reference: ContentReference) -> Self {
        Self {
            block_number,
            reference,
            removed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ContentReference {
        ContentReference {
            hash_function: 0x12,
            digest: vec![1, 2, 3, 4],
            size: 4,
            storage_engine: 1,
        }
    }

    #[test]
    fn removed_defaults_to_false() {
        let json = r#"{"block_number":7,"reference":{"hash_function":18,"digest":"01020304","size":4,"storage_engine":1}}"#;
        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert!(!event.removed);
        assert_eq!(event.block_number, 7);
    }

    #[test]
    fn retraction_sets_removed() {
        let event = ChainEvent::retraction(9, reference());
        assert!(event.removed);
    }
}
