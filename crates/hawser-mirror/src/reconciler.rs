//! Orphan reconciliation: the two-phase purge of stale staged files.
//!
//! Phase one is cheap: find transient records older than the staging TTL.
//! Phase two is the safety net: re-verify every candidate against the
//! ENTIRE ledger history before anything is deleted. The live watcher's
//! resume window can miss events (client downtime, checkpoint gaps), so
//! "no live event arrived" is never, on its own, grounds to destroy bytes.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hawser_chain::{HistoryFilter, LedgerClient};
use hawser_index::TransientIndex;
use hawser_store::{ArchiveStore, StagingArea};
use hawser_types::{ChainEvent, ContentReference, TransientFileRecord};

use crate::context::MirrorContext;
use crate::error::MirrorResult;
use crate::step::mirror_staged;

/// Counts from one reconciliation sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records past the TTL this sweep looked at.
    pub expired: usize,
    /// Confirmed-live records mirrored and cleared.
    pub mirrored: usize,
    /// Unconfirmed records purged (staged file, archive copy, record).
    pub purged: usize,
    /// Expired records left in place (decode failures, races, errors).
    pub retained: usize,
}

/// Periodic sweep reconciling staged files against ledger truth.
pub struct Reconciler {
    ctx: Arc<MirrorContext>,
}

impl Reconciler {
    pub fn new(ctx: Arc<MirrorContext>) -> Self {
        Self { ctx }
    }

    /// Run sweeps on the configured period until `stop` flips.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.ctx.config.sweep_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => match self.sweep().await {
                    Ok(report) if report.expired > 0 => {
                        info!(
                            expired = report.expired,
                            mirrored = report.mirrored,
                            purged = report.purged,
                            retained = report.retained,
                            "reconciliation sweep finished"
                        );
                    }
                    Ok(_) => debug!("reconciliation sweep found nothing expired"),
                    Err(err) => warn!(%err, "reconciliation sweep failed"),
                },
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return;
                    }
                }
            }
        }
    }

    /// One sweep: TTL scan, full-history re-verification, then mirror or
    /// purge.
    pub async fn sweep(&self) -> MirrorResult<SweepReport> {
        let cutoff =
            Utc::now() - chrono::Duration::seconds(self.ctx.config.staging_ttl.as_secs() as i64);
        let expired = self.ctx.index.expired_before(cutoff).await?;
        let mut report = SweepReport {
            expired: expired.len(),
            ..SweepReport::default()
        };
        if expired.is_empty() {
            return Ok(report);
        }

        // Recover each record's expected reference from its address. An
        // address that no longer decodes is left alone: purging a record
        // we cannot re-verify would defeat the safety re-check.
        let mut candidates: Vec<(TransientFileRecord, ContentReference)> = Vec::new();
        for record in expired {
            match hawser_codec::decode(record.address.as_str()) {
                Ok(reference) => candidates.push((record, reference)),
                Err(err) => {
                    warn!(address = %record.address, %err, "expired record has an undecodable address; leaving it");
                    report.retained += 1;
                }
            }
        }

        // One query over the whole ledger, bounded by the digest set.
        let mut digests: Vec<Vec<u8>> =
            candidates.iter().map(|(_, r)| r.digest.clone()).collect();
        digests.sort();
        digests.dedup();
        let history = self
            .ctx
            .chain
            .query_history(&HistoryFilter::digests_over_full_history(digests))
            .await?;

        for (record, expected) in candidates {
            if confirmed_by(&history, &expected) {
                match mirror_staged(&self.ctx, &record.address).await {
                    Ok(_) => {
                        info!(address = %record.address, "recovered a staged file the live watch missed");
                        report.mirrored += 1;
                    }
                    Err(err) => {
                        warn!(address = %record.address, %err, "recovery mirror failed; retrying next sweep");
                        report.retained += 1;
                    }
                }
            } else if self.purge(&record).await {
                report.purged += 1;
            } else {
                report.retained += 1;
            }
        }
        Ok(report)
    }

    /// Destroy a staged file nothing on the ledger refers to. Returns
    /// whether the purge actually ran.
    async fn purge(&self, record: &TransientFileRecord) -> bool {
        let address = &record.address;

        // The live watcher may have mirrored this address since the expiry
        // scan. If the record is already gone, the mirror won; stand down.
        match self.ctx.index.contains(address).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(address = %address, "record cleared concurrently; skipping purge");
                return false;
            }
            Err(err) => {
                warn!(address = %address, %err, "membership re-check failed; skipping purge");
                return false;
            }
        }

        if let Err(err) = self.ctx.staging.remove(address).await {
            warn!(address = %address, %err, "failed to delete staged file; record kept");
            return false;
        }
        // Best effort: a failed archive delete never blocks the purge.
        if let Err(err) = self.ctx.archive.delete(address).await {
            warn!(address = %address, %err, "archive delete failed");
        }
        if let Err(err) = self.ctx.index.remove(address).await {
            warn!(address = %address, %err, "failed to delete transient record");
            return false;
        }
        info!(address = %address, uploaded_at = %record.uploaded_at, "purged unreferenced staged file");
        true
    }
}

/// Exact-equality confirmation: hash function, digest, AND declared size
/// must all match. Digest equality alone is not enough — a reference with
/// the same digest but a different size or function must not keep this
/// file alive.
fn confirmed_by(history: &[ChainEvent], expected: &ContentReference) -> bool {
    history.iter().any(|event| {
        !event.removed
            && event.reference.hash_function == expected.hash_function
            && event.reference.size == expected.size
            && event.reference.digest == expected.digest
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MirrorConfig;
    use crate::testutil::TestHarness;
    use hawser_store::{FailingArchive, MemoryNetwork};
    use std::time::Duration;

    fn harness_with_ttl(ttl_secs: u64) -> TestHarness {
        TestHarness::with_config(MirrorConfig {
            staging_ttl: Duration::from_secs(ttl_secs),
            sweep_interval: Duration::from_millis(50),
            ..MirrorConfig::default()
        })
    }

    #[tokio::test]
    async fn fresh_records_are_not_touched() {
        let h = harness_with_ttl(3600);
        let address = h.stage_and_record(b"fresh", 10).await;
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert!(h.index.contains(&address).await.unwrap());
    }

    #[tokio::test]
    async fn missed_event_is_recovered_not_purged() {
        let h = harness_with_ttl(5);
        // Staged long ago; the referencing event sits in history but was
        // never delivered live.
        let address = h.stage_and_record(b"missed", 60).await;
        h.chain
            .record_history(100, TestHarness::reference_for(b"missed"));
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report.expired, 1);
        assert_eq!(report.mirrored, 1);
        assert_eq!(report.purged, 0);
        assert!(h.network.contains(&address));
        assert!(!h.index.contains(&address).await.unwrap());
        assert!(!h.staging.exists(&address).await.unwrap());
    }

    #[tokio::test]
    async fn unreferenced_records_are_purged_everywhere() {
        let h = harness_with_ttl(5);
        let address = h.stage_and_record(b"orphan", 60).await;
        h.archive.put(&address);
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report.purged, 1);
        assert!(!h.staging.exists(&address).await.unwrap());
        assert!(!h.archive.contains(&address));
        assert!(!h.index.contains(&address).await.unwrap());
        assert!(!h.network.contains(&address));
    }

    #[tokio::test]
    async fn digest_match_with_wrong_size_does_not_confirm() {
        let h = harness_with_ttl(5);
        let address = h.stage_and_record(b"collide", 60).await;
        // History carries the same digest bytes twice, once declaring a
        // wrong size and once a different hash function. Neither may keep
        // the file alive.
        let mut wrong_size = TestHarness::reference_for(b"collide");
        wrong_size.size = 20;
        let mut wrong_function = TestHarness::reference_for(b"collide");
        wrong_function.hash_function = 0x11;
        h.chain.record_history(50, wrong_size);
        h.chain.record_history(51, wrong_function);
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report.purged, 1);
        assert_eq!(report.mirrored, 0);
        assert!(!h.index.contains(&address).await.unwrap());
    }

    #[tokio::test]
    async fn purge_stands_down_when_the_record_vanishes() {
        let h = harness_with_ttl(5);
        let address = h.stage_and_record(b"racing", 60).await;
        h.chain.connect().await.unwrap();

        // Simulate the live mirror winning between the expiry scan and the
        // purge: the record disappears before the sweep's delete.
        let stale_scan_entry = TransientFileRecord::new(
            address.clone(),
            Utc::now() - chrono::Duration::seconds(60),
        );
        h.index.remove(&address).await.unwrap();

        let reconciler = Reconciler::new(h.ctx.clone());
        assert!(!reconciler.purge(&stale_scan_entry).await);
        // The staged bytes survive for the path that owns them now.
        assert!(h.staging.exists(&address).await.unwrap());
    }

    #[tokio::test]
    async fn archive_failure_does_not_block_the_purge() {
        let h = harness_with_ttl(5);
        let address = h.stage_and_record(b"stubborn", 60).await;
        h.chain.connect().await.unwrap();

        let ctx = Arc::new(crate::context::MirrorContext::new(
            h.ctx.config.clone(),
            h.chain.clone(),
            h.index.clone(),
            h.index.clone(),
            h.network.clone(),
            h.staging.clone(),
            Arc::new(FailingArchive),
        ));
        let report = Reconciler::new(ctx).sweep().await.unwrap();
        assert_eq!(report.purged, 1);
        assert!(!h.index.contains(&address).await.unwrap());
    }

    #[tokio::test]
    async fn undecodable_addresses_are_never_purged() {
        let h = harness_with_ttl(5);
        let address = hawser_types::CanonicalAddress::new("0OIl-not-base58");
        h.record(&address, 60).await;
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report.retained, 1);
        assert_eq!(report.purged, 0);
        assert!(h.index.contains(&address).await.unwrap());
    }

    #[tokio::test]
    async fn integrity_failure_during_recovery_retains_the_record() {
        let h = harness_with_ttl(5);
        // Staged bytes do not match the address the record is filed under.
        let reference = TestHarness::reference_for(b"real content");
        let address = hawser_codec::encode(&reference).unwrap();
        h.staging.stage(&address, b"corrupted content");
        h.record(&address, 60).await;
        h.chain.record_history(10, reference);
        h.chain.connect().await.unwrap();

        let report = Reconciler::new(h.ctx.clone()).sweep().await.unwrap();
        assert_eq!(report.retained, 1);
        assert!(h.index.contains(&address).await.unwrap());
        assert!(h.staging.exists(&address).await.unwrap());
    }

    #[tokio::test]
    async fn periodic_run_sweeps_until_stopped() {
        let h = harness_with_ttl(5);
        let address = h.stage_and_record(b"periodic orphan", 60).await;
        h.chain.connect().await.unwrap();

        let reconciler = Arc::new(Reconciler::new(h.ctx.clone()));
        let (stop_tx, stop_rx) = watch::channel(false);
        let runner = reconciler.clone();
        let handle = tokio::spawn(async move { runner.run(stop_rx).await });

        h.wait_for(|| h.index.record_count() == 0).await;
        stop_tx.send_replace(true);
        handle.await.unwrap();
        assert!(!h.staging.exists(&address).await.unwrap());
    }

    #[tokio::test]
    async fn sweep_fails_cleanly_without_a_connection() {
        let h = harness_with_ttl(5);
        h.stage_and_record(b"waiting", 60).await;
        // No connect(): the history query must fail, and nothing may be
        // deleted on the strength of a failed re-verification.
        let err = Reconciler::new(h.ctx.clone()).sweep().await.unwrap_err();
        assert!(matches!(err, crate::error::MirrorError::Chain(_)));
        assert_eq!(h.index.record_count(), 1);
    }

    #[tokio::test]
    async fn confirmation_requires_all_three_fields() {
        let reference = TestHarness::reference_for(b"x");
        let exact = ChainEvent::new(1, reference.clone());

        let mut wrong_size = reference.clone();
        wrong_size.size = 31;
        let mut wrong_function = reference.clone();
        wrong_function.hash_function = 0x13;
        let mut wrong_digest = reference.clone();
        wrong_digest.digest[0] ^= 0xff;

        assert!(confirmed_by(&[exact.clone()], &reference));
        assert!(!confirmed_by(&[ChainEvent::new(1, wrong_size)], &reference));
        assert!(!confirmed_by(
            &[ChainEvent::new(1, wrong_function)],
            &reference
        ));
        assert!(!confirmed_by(
            &[ChainEvent::new(1, wrong_digest)],
            &reference
        ));
        assert!(!confirmed_by(
            &[ChainEvent::retraction(1, reference.clone())],
            &reference
        ));
    }

    #[tokio::test]
    async fn address_of_memory_network_confirms_itself() {
        // The reference minted for staged bytes matches what the network
        // will compute, so recovery mirrors cleanly end to end.
        let reference = TestHarness::reference_for(b"self test");
        let address = hawser_codec::encode(&reference).unwrap();
        assert_eq!(address, MemoryNetwork::address_of(b"self test"));
    }
}
