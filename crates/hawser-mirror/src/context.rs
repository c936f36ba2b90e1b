use std::sync::Arc;

use hawser_chain::LedgerClient;
use hawser_index::{CheckpointStore, TransientIndex};
use hawser_store::{ArchiveStore, ContentNetwork, StagingArea};

use crate::config::MirrorConfig;

/// Everything the pipeline's activities share.
///
/// One explicit state object, owned by whoever assembles the daemon and
/// handed to the supervisor, watcher, and reconciler by `Arc`. Nothing in
/// here is reachable globally.
pub struct MirrorContext {
    pub config: MirrorConfig,
    pub chain: Arc<dyn LedgerClient>,
    pub checkpoint: Arc<dyn CheckpointStore>,
    pub index: Arc<dyn TransientIndex>,
    pub network: Arc<dyn ContentNetwork>,
    pub staging: Arc<dyn StagingArea>,
    pub archive: Arc<dyn ArchiveStore>,
}

impl MirrorContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: MirrorConfig,
        chain: Arc<dyn LedgerClient>,
        checkpoint: Arc<dyn CheckpointStore>,
        index: Arc<dyn TransientIndex>,
        network: Arc<dyn ContentNetwork>,
        staging: Arc<dyn StagingArea>,
        archive: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            config,
            chain,
            checkpoint,
            index,
            network,
            staging,
            archive,
        }
    }
}
