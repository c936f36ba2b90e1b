//! Live event watcher: one dispatch loop from the checkpoint to the head.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use hawser_chain::{LedgerClient, StreamMessage};
use hawser_codec::CodecError;
use hawser_index::CheckpointStore;
use hawser_types::ChainEvent;

use crate::context::MirrorContext;
use crate::error::MirrorResult;
use crate::step::mirror_staged;

/// Consumes the live event stream and drives the mirror step.
///
/// The watcher owns no connection state: it subscribes once, processes
/// messages until the stream ends, and returns. Reconnection and
/// resubscription are exclusively the supervisor's responsibility.
pub struct EventWatcher {
    ctx: Arc<MirrorContext>,
}

impl EventWatcher {
    pub fn new(ctx: Arc<MirrorContext>) -> Self {
        Self { ctx }
    }

    /// Subscribe from `checkpoint + 1` (or the genesis block) and process
    /// the stream until it ends.
    pub async fn run(&self) -> MirrorResult<()> {
        let from_block = match self.ctx.checkpoint.load().await? {
            Some(block) => block + 1,
            None => self.ctx.config.genesis_block,
        };
        info!(from_block, "watching content-reference events");

        let mut stream = self.ctx.chain.subscribe(from_block).await?;
        while let Some(message) = stream.recv().await {
            match message {
                StreamMessage::Event(event) => self.process(event).await,
                StreamMessage::Error(reason) => {
                    warn!(%reason, "event stream reported an error");
                }
            }
        }
        info!("event stream ended");
        Ok(())
    }

    /// Handle one delivered event. Never fails the stream: every problem
    /// is logged with enough context for manual replay, and the
    /// reconciler covers whatever the live path leaves behind.
    async fn process(&self, event: ChainEvent) {
        let block = event.block_number;
        if event.removed {
            warn!(
                block,
                digest = %event.reference.digest_hex(),
                "reorganization retracted an event; mirrored state left as-is"
            );
            return;
        }

        let address = match hawser_codec::encode(&event.reference) {
            Ok(address) => address,
            Err(CodecError::UnsupportedEngine(tag)) => {
                warn!(block, tag, "skipping event for unsupported storage engine");
                return;
            }
            Err(err) => {
                warn!(block, %err, "skipping event with undecodable reference");
                return;
            }
        };

        match mirror_staged(&self.ctx, &address).await {
            Ok(outcome) => {
                match self.ctx.checkpoint.advance(block).await {
                    Ok(checkpoint) => {
                        debug!(address = %address, block, checkpoint, ?outcome, "event processed");
                    }
                    Err(err) => {
                        warn!(address = %address, block, %err, "checkpoint advance failed");
                    }
                }
            }
            Err(err) => {
                error!(
                    address = %address,
                    block,
                    %err,
                    "mirror failed; transient record retained for reconciliation"
                );
            }
        }
    }
}
