use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hawser_types::{CanonicalAddress, TransientFileRecord};

use crate::error::IndexResult;

/// Durable scalar holding the last safely processed block height.
///
/// Implementations must make `advance` a max-merge: the stored value after
/// `advance(b)` is `max(previous, b)`, atomically with respect to other
/// advances. `clear` exists solely for explicit invalidation after a
/// detected ledger reset in development environments.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// The current checkpoint, or `None` if never set (or cleared).
    async fn load(&self) -> IndexResult<Option<u64>>;

    /// Merge `block` into the checkpoint and return the resulting value.
    async fn advance(&self, block: u64) -> IndexResult<u64>;

    /// Delete the checkpoint.
    async fn clear(&self) -> IndexResult<()>;
}

/// Durable registry of staged-but-not-yet-mirrored files.
///
/// Keys are canonical addresses. `remove` is idempotent — removing an
/// absent record is not an error, because the live path and the
/// reconciliation path may both try to clear the same entry.
#[async_trait]
pub trait TransientIndex: Send + Sync {
    /// Register a staged file.
    async fn record(&self, record: &TransientFileRecord) -> IndexResult<()>;

    /// Look up a record by address.
    async fn get(&self, address: &CanonicalAddress) -> IndexResult<Option<TransientFileRecord>>;

    /// Whether a record currently exists for `address`.
    async fn contains(&self, address: &CanonicalAddress) -> IndexResult<bool>;

    /// Delete a record. Absence is not an error.
    async fn remove(&self, address: &CanonicalAddress) -> IndexResult<()>;

    /// All records staged at or before `cutoff`.
    async fn expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> IndexResult<Vec<TransientFileRecord>>;
}
