use async_trait::async_trait;
use tokio::sync::mpsc;

use hawser_types::ChainEvent;

use crate::error::ChainResult;
use crate::message::{HistoryFilter, StreamMessage};

/// Client for an append-only ledger of content-reference events.
///
/// All implementations must satisfy these invariants:
/// - Delivery is at-least-once: a subscription may replay events already
///   seen, and consumers must tolerate duplicates.
/// - `subscribe` covers `from_block` through the live head; events arrive
///   in arrival order, which across blocks is not guaranteed to be height
///   order after a resume.
/// - `query_history` serves canonical history only — retracted events do
///   not appear — and is independent of any active subscription window.
/// - The subscription channel closes when the connection is lost; the
///   client never resubscribes on its own.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Establish the provider connection.
    async fn connect(&self) -> ChainResult<()>;

    /// Subscribe to content-reference events from `from_block` through the
    /// live head. The returned channel yields typed messages until the
    /// connection drops or the receiver is dropped.
    async fn subscribe(&self, from_block: u64) -> ChainResult<mpsc::Receiver<StreamMessage>>;

    /// Query recorded history matching `filter`.
    async fn query_history(&self, filter: &HistoryFilter) -> ChainResult<Vec<ChainEvent>>;

    /// Cheap liveness check against the provider.
    async fn probe(&self) -> ChainResult<()>;

    /// Resolves when the connection is lost. Returns immediately if there
    /// is no live connection.
    async fn disconnected(&self);
}
