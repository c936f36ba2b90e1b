//! Shared scaffolding for pipeline tests: an all-in-memory context with
//! handles to every backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use hawser_chain::MemoryLedger;
use hawser_index::{MemoryIndex, TransientIndex};
use hawser_store::{MemoryArchive, MemoryNetwork, MemoryStaging};
use hawser_types::{CanonicalAddress, ContentReference, TransientFileRecord};

use crate::config::MirrorConfig;
use crate::context::MirrorContext;

pub(crate) struct TestHarness {
    pub ctx: Arc<MirrorContext>,
    pub chain: Arc<MemoryLedger>,
    pub index: Arc<MemoryIndex>,
    pub network: Arc<MemoryNetwork>,
    pub staging: Arc<MemoryStaging>,
    pub archive: Arc<MemoryArchive>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(MirrorConfig {
            reconnect_delay: Duration::from_millis(20),
            probe_interval: Duration::from_millis(50),
            sweep_interval: Duration::from_millis(100),
            ..MirrorConfig::default()
        })
    }

    pub fn with_config(config: MirrorConfig) -> Self {
        let chain = Arc::new(MemoryLedger::new());
        let index = Arc::new(MemoryIndex::new());
        let network = Arc::new(MemoryNetwork::new());
        let staging = Arc::new(MemoryStaging::new());
        let archive = Arc::new(MemoryArchive::new());
        let ctx = Arc::new(MirrorContext::new(
            config,
            chain.clone(),
            index.clone(),
            index.clone(),
            network.clone(),
            staging.clone(),
            archive.clone(),
        ));
        Self {
            ctx,
            chain,
            index,
            network,
            staging,
            archive,
        }
    }

    /// The reference whose canonical address matches what the network
    /// computes for `data`.
    pub fn reference_for(data: &[u8]) -> ContentReference {
        let address = MemoryNetwork::address_of(data);
        hawser_codec::decode(address.as_str()).expect("network mints valid addresses")
    }

    /// Register a transient record staged `age_secs` ago.
    pub async fn record(&self, address: &CanonicalAddress, age_secs: i64) {
        let record = TransientFileRecord::new(
            address.clone(),
            Utc::now() - chrono::Duration::seconds(age_secs),
        );
        self.index.record(&record).await.unwrap();
    }

    /// Stage `data` and register its record, returning the address.
    pub async fn stage_and_record(&self, data: &[u8], age_secs: i64) -> CanonicalAddress {
        let address = MemoryNetwork::address_of(data);
        self.staging.stage(&address, data);
        self.record(&address, age_secs).await;
        address
    }

    /// Poll until `predicate` holds or the timeout elapses.
    pub async fn wait_for<F>(&self, mut predicate: F)
    where
        F: FnMut() -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !predicate() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }
}
