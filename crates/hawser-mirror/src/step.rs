//! The shared mirror step: staging to content network, with integrity
//! verification and bookkeeping cleanup.
//!
//! Both the live watcher and the reconciler's recovery path run this exact
//! step, so the two paths cannot drift apart in semantics.

use tracing::debug;

use hawser_index::TransientIndex;
use hawser_store::{ContentNetwork, StagingArea};
use hawser_types::CanonicalAddress;

use crate::context::MirrorContext;
use crate::error::{MirrorError, MirrorResult};

/// What the mirror step found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The staged bytes were added to the content network.
    Mirrored,
    /// Nothing was staged — a previous delivery already completed the
    /// mirror. The bookkeeping is still cleared.
    AlreadyMirrored,
}

/// Mirror the staged file at `address` into the content network.
///
/// On success the transient record and the staged file are both removed
/// (idempotent; either may already be gone). If the network returns a
/// different address than expected, nothing is cleared and
/// [`MirrorError::Integrity`] is returned so the reconciler can retry
/// later.
pub async fn mirror_staged(
    ctx: &MirrorContext,
    address: &CanonicalAddress,
) -> MirrorResult<MirrorOutcome> {
    let Some(data) = ctx.staging.read(address).await? else {
        debug!(address = %address, "no staged bytes; clearing bookkeeping only");
        ctx.index.remove(address).await?;
        return Ok(MirrorOutcome::AlreadyMirrored);
    };

    let stored = ctx.network.add(&data).await?;
    if stored != *address {
        return Err(MirrorError::Integrity {
            expected: address.clone(),
            actual: stored,
        });
    }

    ctx.index.remove(address).await?;
    ctx.staging.remove(address).await?;
    Ok(MirrorOutcome::Mirrored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestHarness;
    use hawser_store::MemoryNetwork;

    #[tokio::test]
    async fn mirrors_and_clears_bookkeeping() {
        let h = TestHarness::new();
        let address = h.stage_and_record(b"bytes", 0).await;

        let outcome = mirror_staged(&h.ctx, &address).await.unwrap();
        assert_eq!(outcome, MirrorOutcome::Mirrored);
        assert!(h.network.contains(&address));
        assert!(!h.index.contains(&address).await.unwrap());
        assert!(!h.staging.exists(&address).await.unwrap());
    }

    #[tokio::test]
    async fn second_mirror_is_a_clean_noop() {
        let h = TestHarness::new();
        let address = h.stage_and_record(b"bytes", 0).await;

        assert_eq!(
            mirror_staged(&h.ctx, &address).await.unwrap(),
            MirrorOutcome::Mirrored
        );
        assert_eq!(
            mirror_staged(&h.ctx, &address).await.unwrap(),
            MirrorOutcome::AlreadyMirrored
        );
    }

    #[tokio::test]
    async fn integrity_mismatch_keeps_everything() {
        let h = TestHarness::new();
        // Stage bytes under an address they do not hash to.
        let address = MemoryNetwork::address_of(b"expected");
        h.staging.stage(&address, b"tampered");
        h.record(&address, 0).await;

        let err = mirror_staged(&h.ctx, &address).await.unwrap_err();
        assert!(matches!(err, MirrorError::Integrity { .. }));
        assert!(h.index.contains(&address).await.unwrap());
        assert!(h.staging.exists(&address).await.unwrap());
    }
}
