//! Connection lifecycle: connect, run the watcher, recover from loss.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use hawser_chain::LedgerClient;
use hawser_index::CheckpointStore;

use crate::context::MirrorContext;
use crate::watcher::EventWatcher;

/// Where the supervisor currently is in the connection lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns the ledger connection and restarts the watcher across losses.
///
/// The cycle is `Disconnected -> Connecting -> Connected` and back to
/// `Disconnected` on loss, with a fixed delay before the next attempt.
/// Against a development ledger, a loss first invalidates the checkpoint:
/// the chain behind a dropped local connection has usually been reset, and
/// resuming from a stale block would silently skip or duplicate events.
pub struct Supervisor {
    ctx: Arc<MirrorContext>,
    state: watch::Sender<ConnectionState>,
}

impl Supervisor {
    pub fn new(ctx: Arc<MirrorContext>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { ctx, state }
    }

    /// Observe lifecycle transitions (for assembly code and tests).
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Drive the connection lifecycle forever.
    pub async fn run(&self) {
        loop {
            self.state.send_replace(ConnectionState::Connecting);
            match self.ctx.chain.connect().await {
                Ok(()) => {
                    self.state.send_replace(ConnectionState::Connected);
                    info!("ledger connection established");

                    let watcher = EventWatcher::new(self.ctx.clone());
                    tokio::select! {
                        result = watcher.run() => match result {
                            Ok(()) => info!("event stream closed; treating as connection loss"),
                            Err(err) => warn!(%err, "watcher failed; treating as connection loss"),
                        },
                        _ = self.ctx.chain.disconnected() => {
                            warn!("ledger connection lost");
                        }
                    }
                    self.on_connection_loss().await;
                }
                Err(err) => {
                    warn!(%err, "connection attempt failed");
                }
            }
            self.state.send_replace(ConnectionState::Disconnected);
            tokio::time::sleep(self.ctx.config.reconnect_delay).await;
        }
    }

    async fn on_connection_loss(&self) {
        if self.ctx.config.environment.is_development() {
            // A dropped development connection means the chain was reset;
            // the stored block height refers to a chain that no longer
            // exists.
            match self.ctx.checkpoint.clear().await {
                Ok(()) => info!("checkpoint cleared after development-ledger reset"),
                Err(err) => warn!(%err, "failed to clear checkpoint after reset"),
            }
        }
    }

    /// Periodic liveness probe. Failures are logged and swallowed: the
    /// probe keeps the connection warm, loss detection belongs to the
    /// lifecycle signal.
    pub async fn run_probe(&self, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.ctx.config.probe_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.ctx.chain.probe().await {
                        debug!(%err, "liveness probe failed");
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, MirrorConfig};
    use crate::testutil::TestHarness;
    use hawser_index::CheckpointStore;
    use std::time::Duration;

    fn dev_harness() -> TestHarness {
        TestHarness::with_config(MirrorConfig {
            environment: Environment::Development,
            reconnect_delay: Duration::from_millis(20),
            probe_interval: Duration::from_millis(30),
            ..MirrorConfig::default()
        })
    }

    async fn wait_for_state(
        rx: &mut watch::Receiver<ConnectionState>,
        wanted: ConnectionState,
    ) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if *rx.borrow() == wanted {
                    return;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("state not reached in time");
    }

    #[tokio::test]
    async fn connects_and_publishes_state() {
        let h = TestHarness::new();
        let supervisor = Arc::new(Supervisor::new(h.ctx.clone()));
        let mut state = supervisor.state();

        let runner = supervisor.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_for_state(&mut state, ConnectionState::Connected).await;
        assert!(h.chain.is_connected());
        handle.abort();
    }

    #[tokio::test]
    async fn development_loss_clears_the_checkpoint() {
        let h = dev_harness();
        h.ctx.checkpoint.advance(42).await.unwrap();
        // An event below the stale checkpoint: invisible to the first
        // subscription, reachable only after a genesis restart.
        let address = h.stage_and_record(b"early block", 0).await;
        h.chain.push_event(5, TestHarness::reference_for(b"early block"));

        let supervisor = Arc::new(Supervisor::new(h.ctx.clone()));
        let mut state = supervisor.state();
        let runner = supervisor.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_for_state(&mut state, ConnectionState::Connected).await;
        assert!(!h.network.contains(&address));
        h.chain.drop_connection();
        wait_for_state(&mut state, ConnectionState::Disconnected).await;

        assert_eq!(h.ctx.checkpoint.load().await.unwrap(), None);
        // The supervisor reconnects and the watch restarts from genesis,
        // now delivering block 5.
        wait_for_state(&mut state, ConnectionState::Connected).await;
        h.wait_for(|| h.network.contains(&address)).await;
        handle.abort();
    }

    #[tokio::test]
    async fn production_loss_keeps_the_checkpoint() {
        let h = TestHarness::new();
        h.ctx.checkpoint.advance(42).await.unwrap();

        let supervisor = Arc::new(Supervisor::new(h.ctx.clone()));
        let mut state = supervisor.state();
        let runner = supervisor.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_for_state(&mut state, ConnectionState::Connected).await;
        h.chain.drop_connection();
        wait_for_state(&mut state, ConnectionState::Disconnected).await;

        assert_eq!(h.ctx.checkpoint.load().await.unwrap(), Some(42));
        handle.abort();
    }

    #[tokio::test]
    async fn failed_connects_are_retried() {
        let h = TestHarness::new();
        h.chain.fail_next_connects(2);

        let supervisor = Arc::new(Supervisor::new(h.ctx.clone()));
        let mut state = supervisor.state();
        let runner = supervisor.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        wait_for_state(&mut state, ConnectionState::Connected).await;
        handle.abort();
    }

    #[tokio::test]
    async fn probe_failures_are_swallowed() {
        let h = TestHarness::new();
        // Disconnected ledger: every probe fails.
        let supervisor = Arc::new(Supervisor::new(h.ctx.clone()));
        let (stop_tx, stop_rx) = watch::channel(false);

        let runner = supervisor.clone();
        let handle = tokio::spawn(async move { runner.run_probe(stop_rx).await });

        h.wait_for(|| h.chain.probe_count() >= 2).await;
        stop_tx.send_replace(true);
        handle.await.unwrap();
    }
}
