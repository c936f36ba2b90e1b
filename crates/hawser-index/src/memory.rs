use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hawser_types::{CanonicalAddress, TransientFileRecord};

use crate::error::IndexResult;
use crate::traits::{CheckpointStore, TransientIndex};

/// In-memory checkpoint + transient index for tests and embedding.
#[derive(Default)]
pub struct MemoryIndex {
    checkpoint: RwLock<Option<u64>>,
    records: RwLock<BTreeMap<String, TransientFileRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transient records currently held.
    pub fn record_count(&self) -> usize {
        self.records.read().expect("index lock poisoned").len()
    }
}

#[async_trait]
impl CheckpointStore for MemoryIndex {
    async fn load(&self) -> IndexResult<Option<u64>> {
        Ok(*self.checkpoint.read().expect("index lock poisoned"))
    }

    async fn advance(&self, block: u64) -> IndexResult<u64> {
        let mut checkpoint = self.checkpoint.write().expect("index lock poisoned");
        let merged = checkpoint.map_or(block, |current| current.max(block));
        *checkpoint = Some(merged);
        Ok(merged)
    }

    async fn clear(&self) -> IndexResult<()> {
        *self.checkpoint.write().expect("index lock poisoned") = None;
        Ok(())
    }
}

#[async_trait]
impl TransientIndex for MemoryIndex {
    async fn record(&self, record: &TransientFileRecord) -> IndexResult<()> {
        self.records
            .write()
            .expect("index lock poisoned")
            .insert(record.address.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn get(
        &self,
        address: &CanonicalAddress,
    ) -> IndexResult<Option<TransientFileRecord>> {
        Ok(self
            .records
            .read()
            .expect("index lock poisoned")
            .get(address.as_str())
            .cloned())
    }

    async fn contains(&self, address: &CanonicalAddress) -> IndexResult<bool> {
        Ok(self
            .records
            .read()
            .expect("index lock poisoned")
            .contains_key(address.as_str()))
    }

    async fn remove(&self, address: &CanonicalAddress) -> IndexResult<()> {
        self.records
            .write()
            .expect("index lock poisoned")
            .remove(address.as_str());
        Ok(())
    }

    async fn expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> IndexResult<Vec<TransientFileRecord>> {
        Ok(self
            .records
            .read()
            .expect("index lock poisoned")
            .values()
            .filter(|r| r.expired_at(cutoff))
            .cloned()
            .collect())
    }
}
