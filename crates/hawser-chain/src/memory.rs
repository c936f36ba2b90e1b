use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::warn;

use hawser_types::{ChainEvent, ContentReference};

use crate::error::{ChainError, ChainResult};
use crate::message::{HistoryFilter, StreamMessage};
use crate::traits::LedgerClient;

/// Capacity of the per-subscription channels.
const CHANNEL_CAPACITY: usize = 1024;

#[derive(Default)]
struct LedgerState {
    history: Vec<ChainEvent>,
    head: u64,
}

/// In-memory ledger for tests, local demos, and embedding.
///
/// Events pushed with [`push_event`](Self::push_event) are recorded in
/// history and delivered to live subscribers. [`record_history`]
/// (Self::record_history) records without delivering, simulating an event
/// the live pipeline missed. Connections are controlled explicitly:
/// [`drop_connection`](Self::drop_connection) ends every live
/// subscription, and [`fail_next_connects`](Self::fail_next_connects)
/// makes upcoming connection attempts fail.
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    live: broadcast::Sender<StreamMessage>,
    connected: watch::Sender<bool>,
    fail_connects: AtomicU32,
    probes: AtomicU32,
}

impl MemoryLedger {
    pub fn new() -> Self {
        let (live, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (connected, _) = watch::channel(false);
        Self {
            state: RwLock::new(LedgerState::default()),
            live,
            connected,
            fail_connects: AtomicU32::new(0),
            probes: AtomicU32::new(0),
        }
    }

    /// Record an event and deliver it to live subscribers.
    pub fn push_event(&self, block_number: u64, reference: ContentReference) {
        let event = ChainEvent::new(block_number, reference);
        {
            let mut state = self.state.write().expect("ledger lock poisoned");
            state.head = state.head.max(block_number);
            state.history.push(event.clone());
        }
        let _ = self.live.send(StreamMessage::Event(event));
    }

    /// Record an event in history WITHOUT live delivery — the shape of an
    /// event the watcher missed during an outage.
    pub fn record_history(&self, block_number: u64, reference: ContentReference) {
        let mut state = self.state.write().expect("ledger lock poisoned");
        state.head = state.head.max(block_number);
        state.history.push(ChainEvent::new(block_number, reference));
    }

    /// Deliver a retraction to live subscribers. Retractions are not part
    /// of canonical history and never show up in historical queries.
    pub fn push_retraction(&self, block_number: u64, reference: ContentReference) {
        let _ = self
            .live
            .send(StreamMessage::Event(ChainEvent::retraction(
                block_number,
                reference,
            )));
    }

    /// Deliver a stream-level fault to live subscribers.
    pub fn emit_stream_error(&self, reason: impl Into<String>) {
        let _ = self.live.send(StreamMessage::Error(reason.into()));
    }

    /// Drop the connection: live subscriptions end, `disconnected()`
    /// resolves.
    pub fn drop_connection(&self) {
        self.connected.send_replace(false);
    }

    /// Make the next `n` calls to `connect` fail.
    pub fn fail_next_connects(&self, n: u32) {
        self.fail_connects.store(n, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Number of liveness probes received.
    pub fn probe_count(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    /// Highest recorded block.
    pub fn head(&self) -> u64 {
        self.state.read().expect("ledger lock poisoned").head
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn connect(&self) -> ChainResult<()> {
        let remaining = self.fail_connects.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_connects.store(remaining - 1, Ordering::SeqCst);
            return Err(ChainError::Connectivity(
                "simulated connection failure".into(),
            ));
        }
        self.connected.send_replace(true);
        Ok(())
    }

    async fn subscribe(&self, from_block: u64) -> ChainResult<mpsc::Receiver<StreamMessage>> {
        if !self.is_connected() {
            return Err(ChainError::NotConnected);
        }
        // Order matters: subscribe to the live feed before snapshotting the
        // backlog, so nothing falls in the gap. Events pushed in between may
        // arrive twice, which at-least-once delivery permits.
        let mut live = self.live.subscribe();
        let mut connected = self.connected.subscribe();
        let backlog: Vec<ChainEvent> = {
            let state = self.state.read().expect("ledger lock poisoned");
            state
                .history
                .iter()
                .filter(|e| e.block_number >= from_block)
                .cloned()
                .collect()
        };

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            for event in backlog {
                if tx.send(StreamMessage::Event(event)).await.is_err() {
                    return;
                }
            }
            loop {
                tokio::select! {
                    message = live.recv() => match message {
                        Ok(m) => {
                            if tx.send(m).await.is_err() {
                                return;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscription lagged behind the live feed");
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                    changed = connected.changed() => {
                        if changed.is_err() || !*connected.borrow() {
                            return;
                        }
                    }
                }
            }
        });
        Ok(rx)
    }

    async fn query_history(&self, filter: &HistoryFilter) -> ChainResult<Vec<ChainEvent>> {
        if !self.is_connected() {
            return Err(ChainError::NotConnected);
        }
        let state = self.state.read().expect("ledger lock poisoned");
        Ok(state
            .history
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn probe(&self) -> ChainResult<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.is_connected() {
            Ok(())
        } else {
            Err(ChainError::NotConnected)
        }
    }

    async fn disconnected(&self) {
        let mut connected = self.connected.subscribe();
        loop {
            if !*connected.borrow() {
                return;
            }
            if connected.changed().await.is_err() {
                return;
            }
        }
    }
}
