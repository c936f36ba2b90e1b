use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use hawser_types::{CanonicalAddress, TransientFileRecord};

use crate::error::{IndexError, IndexResult};
use crate::traits::{CheckpointStore, TransientIndex};

/// Tree holding named scalar variables (the checkpoint).
const VARIABLES_TREE: &str = "variables";
/// Tree holding transient staged-file records, keyed by address.
const STAGED_TREE: &str = "staged_files";
/// Variable name of the checkpoint.
const CHECKPOINT_KEY: &[u8] = b"last_event_block";

/// Embedded durable backend for the checkpoint and the transient index.
///
/// Layout mirrors the two bookkeeping tables: a `variables` tree for
/// scalar values and a `staged_files` tree mapping address to serialized
/// record. The checkpoint max-merge runs inside a sled `update_and_fetch`,
/// so concurrent advances cannot regress it.
pub struct SledIndex {
    db: sled::Db,
    variables: sled::Tree,
    staged: sled::Tree,
}

impl SledIndex {
    /// Open (or create) the index at `path`.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let db = sled::open(path)?;
        let variables = db.open_tree(VARIABLES_TREE)?;
        let staged = db.open_tree(STAGED_TREE)?;
        Ok(Self {
            db,
            variables,
            staged,
        })
    }

    async fn flush(&self) -> IndexResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn decode_block(value: &[u8]) -> IndexResult<u64> {
        let bytes: [u8; 8] = value.try_into().map_err(|_| IndexError::CorruptValue {
            key: "last_event_block".into(),
            reason: format!("expected 8 bytes, found {}", value.len()),
        })?;
        Ok(u64::from_be_bytes(bytes))
    }

    fn decode_record(key: &[u8], value: &[u8]) -> IndexResult<TransientFileRecord> {
        bincode::deserialize(value).map_err(|e| IndexError::CorruptValue {
            key: String::from_utf8_lossy(key).into_owned(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CheckpointStore for SledIndex {
    async fn load(&self) -> IndexResult<Option<u64>> {
        match self.variables.get(CHECKPOINT_KEY)? {
            Some(value) => Ok(Some(Self::decode_block(&value)?)),
            None => Ok(None),
        }
    }

    async fn advance(&self, block: u64) -> IndexResult<u64> {
        let merged = self.variables.update_and_fetch(CHECKPOINT_KEY, |current| {
            let merged = match current.and_then(|v| <[u8; 8]>::try_from(v).ok()) {
                Some(bytes) => u64::from_be_bytes(bytes).max(block),
                None => block,
            };
            Some(merged.to_be_bytes().to_vec())
        })?;
        self.flush().await?;
        match merged {
            Some(value) => Self::decode_block(&value),
            // update_and_fetch always stores a value here.
            None => Ok(block),
        }
    }

    async fn clear(&self) -> IndexResult<()> {
        self.variables.remove(CHECKPOINT_KEY)?;
        self.flush().await
    }
}

#[async_trait]
impl TransientIndex for SledIndex {
    async fn record(&self, record: &TransientFileRecord) -> IndexResult<()> {
        let value = bincode::serialize(record).map_err(|e| IndexError::CorruptValue {
            key: record.address.as_str().into(),
            reason: e.to_string(),
        })?;
        self.staged.insert(record.address.as_str(), value)?;
        self.flush().await
    }

    async fn get(
        &self,
        address: &CanonicalAddress,
    ) -> IndexResult<Option<TransientFileRecord>> {
        match self.staged.get(address.as_str())? {
            Some(value) => Ok(Some(Self::decode_record(
                address.as_str().as_bytes(),
                &value,
            )?)),
            None => Ok(None),
        }
    }

    async fn contains(&self, address: &CanonicalAddress) -> IndexResult<bool> {
        Ok(self.staged.contains_key(address.as_str())?)
    }

    async fn remove(&self, address: &CanonicalAddress) -> IndexResult<()> {
        self.staged.remove(address.as_str())?;
        self.flush().await
    }

    async fn expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> IndexResult<Vec<TransientFileRecord>> {
        let mut expired = Vec::new();
        for entry in self.staged.iter() {
            let (key, value) = entry?;
            match Self::decode_record(&key, &value) {
                Ok(record) if record.expired_at(cutoff) => expired.push(record),
                Ok(_) => {}
                // A corrupt record must not block the sweep for the rest.
                Err(err) => warn!(%err, "skipping undecodable transient record"),
            }
        }
        Ok(expired)
    }
}
