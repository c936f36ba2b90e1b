use async_trait::async_trait;

use hawser_types::CanonicalAddress;

use crate::error::StoreResult;

/// Durable content-addressable network.
///
/// All implementations must satisfy these invariants:
/// - The returned address is derived from the content alone, so callers can
///   verify it against an expected address.
/// - `add` is idempotent: adding the same bytes twice returns the same
///   address both times and raises no error on the second call.
#[async_trait]
pub trait ContentNetwork: Send + Sync {
    /// Store `data` and return its content-derived address.
    async fn add(&self, data: &[u8]) -> StoreResult<CanonicalAddress>;
}

/// Ephemeral staging area holding uploads awaiting their on-chain
/// reference.
///
/// `remove` is idempotent; `read` returns `Ok(None)` for an absent file.
/// Only the read/delete surface belongs to the pipeline — staging writes
/// are the producers' business.
#[async_trait]
pub trait StagingArea: Send + Sync {
    /// Whether a staged file exists for `address`.
    async fn exists(&self, address: &CanonicalAddress) -> StoreResult<bool>;

    /// Read the staged bytes, or `None` if nothing is staged.
    async fn read(&self, address: &CanonicalAddress) -> StoreResult<Option<Vec<u8>>>;

    /// Delete the staged file. Absence is not an error.
    async fn remove(&self, address: &CanonicalAddress) -> StoreResult<()>;
}

/// Durable object store holding producer uploads; the pipeline only ever
/// deletes from it, and only best-effort.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Delete the archived copy. Absence is not an error.
    async fn delete(&self, address: &CanonicalAddress) -> StoreResult<()>;
}
