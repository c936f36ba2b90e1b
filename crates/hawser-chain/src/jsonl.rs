//! JSONL file-feed ledger client.
//!
//! Reads chain events from a file of one JSON event per line, replaying the
//! existing contents and then tailing the file for appended lines. Malformed
//! lines are logged and skipped. This backend lets the daemon run end-to-end
//! against a local event feed without any provider SDK.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::warn;

use hawser_types::ChainEvent;

use crate::error::{ChainError, ChainResult};
use crate::message::{HistoryFilter, StreamMessage};
use crate::traits::LedgerClient;

/// Capacity of the per-subscription channels.
const CHANNEL_CAPACITY: usize = 1024;

/// Ledger client backed by a JSONL event feed file.
pub struct JsonlLedger {
    path: PathBuf,
    poll_interval: Duration,
    connected: watch::Sender<bool>,
}

impl JsonlLedger {
    /// Create a client for the feed at `path`, polling for appended lines
    /// at `poll_interval` once the replay reaches end of file.
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            path: path.into(),
            poll_interval,
            connected,
        }
    }

    /// The feed file this client reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Parse the entire feed, skipping malformed lines.
    async fn read_feed(&self) -> ChainResult<Vec<ChainEvent>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut events = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChainEvent>(line) {
                Ok(event) => events.push(event),
                Err(err) => {
                    warn!(line = index + 1, %err, "skipping malformed feed line");
                }
            }
        }
        Ok(events)
    }
}

#[async_trait]
impl LedgerClient for JsonlLedger {
    async fn connect(&self) -> ChainResult<()> {
        tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| ChainError::Connectivity(format!("feed not readable: {e}")))?;
        self.connected.send_replace(true);
        Ok(())
    }

    async fn subscribe(&self, from_block: u64) -> ChainResult<mpsc::Receiver<StreamMessage>> {
        if !self.is_connected() {
            return Err(ChainError::NotConnected);
        }
        let file = tokio::fs::File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut connected = self.connected.subscribe();
        let connected_tx = self.connected.clone();
        let poll_interval = self.poll_interval;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut line_no = 0usize;
            loop {
                tokio::select! {
                    changed = connected.changed() => {
                        if changed.is_err() || !*connected.borrow() {
                            return;
                        }
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            line_no += 1;
                            if line.trim().is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<ChainEvent>(&line) {
                                Ok(event) if event.block_number >= from_block => {
                                    if tx.send(StreamMessage::Event(event)).await.is_err() {
                                        return;
                                    }
                                }
                                Ok(_) => {}
                                Err(err) => {
                                    warn!(line = line_no, %err, "skipping malformed feed line");
                                }
                            }
                        }
                        // End of feed for now; wait for appended lines.
                        Ok(None) => tokio::time::sleep(poll_interval).await,
                        Err(err) => {
                            let _ = tx
                                .send(StreamMessage::Error(format!("feed read failed: {err}")))
                                .await;
                            connected_tx.send_replace(false);
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
        // Canonical history only: retractions never confirm anything.
        Ok(self
            .read_feed()
            .await?
            .into_iter()
            .filter(|e| !e.removed && filter.matches(e))
            .collect())
    }

    async fn probe(&self) -> ChainResult<()> {
        tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| ChainError::Connectivity(format!("feed not readable: {e}")))?;
        Ok(())
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
