use hawser_types::ChainEvent;

/// A single message on the live event channel.
///
/// The subscription delivers events and stream-level faults through one
/// typed channel so the consumer is a single dispatch loop with
/// deterministic ordering, not a set of callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    /// A content-reference event (live or retraction).
    Event(ChainEvent),
    /// A stream-level fault. The subscription may keep delivering events
    /// afterwards; connection loss is signaled separately.
    Error(String),
}

/// Filter for historical queries.
///
/// An empty digest set matches every event; otherwise only events whose
/// digest is in the set match. Block bounds are inclusive; `to_block: None`
/// means the current head.
#[derive(Clone, Debug, Default)]
pub struct HistoryFilter {
    /// Digests to match, exactly. Empty means "all".
    pub digests: Vec<Vec<u8>>,
    /// First block to include.
    pub from_block: u64,
    /// Last block to include; `None` for the current head.
    pub to_block: Option<u64>,
}

impl HistoryFilter {
    /// Filter for a set of digests over the entire ledger history.
    pub fn digests_over_full_history(digests: Vec<Vec<u8>>) -> Self {
        Self {
            digests,
            from_block: 0,
            to_block: None,
        }
    }

    /// Whether the given event satisfies this filter.
    pub fn matches(&self, event: &ChainEvent) -> bool {
        if event.block_number < self.from_block {
            return false;
        }
        if let Some(to) = self.to_block {
            if event.block_number > to {
                return false;
            }
        }
        self.digests.is_empty() || self.digests.iter().any(|d| *d == event.reference.digest)
    }
}
