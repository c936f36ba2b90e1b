use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use hawser_mirror::{Environment, MirrorConfig};

/// On-disk daemon configuration.
///
/// Every field has a default, so a missing file (or an empty one) yields a
/// runnable development setup under `./data`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HawserConfig {
    /// Ledger environment: `production` or `development`.
    pub environment: Environment,
    pub chain: ChainSection,
    pub storage: StorageSection,
    pub connection: ConnectionSection,
    pub reconciler: ReconcilerSection,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainSection {
    /// JSONL event feed the daemon watches.
    pub feed_path: PathBuf,
    /// Block to watch from when no checkpoint exists.
    pub genesis_block: u64,
    /// Seconds between polls for appended feed lines.
    pub poll_interval_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    /// Directory of the embedded bookkeeping index.
    pub index_path: PathBuf,
    /// Staging directory producers upload into.
    pub staging_dir: PathBuf,
    /// Directory of the local content-addressed object store.
    pub objects_dir: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSection {
    /// Seconds between reconnect attempts after a loss.
    pub reconnect_delay_secs: u64,
    /// Seconds between ledger liveness probes.
    pub probe_interval_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerSection {
    /// Seconds a staged file may wait before becoming a purge candidate.
    pub ttl_secs: u64,
    /// Seconds between reconciliation sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for HawserConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            chain: ChainSection::default(),
            storage: StorageSection::default(),
            connection: ConnectionSection::default(),
            reconciler: ReconcilerSection::default(),
        }
    }
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::from("./data/chain-events.jsonl"),
            genesis_block: 0,
            poll_interval_secs: 2,
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./data/index"),
            staging_dir: PathBuf::from("./data/staging"),
            objects_dir: PathBuf::from("./data/objects"),
        }
    }
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: 10,
            probe_interval_secs: 30,
        }
    }
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 600,
        }
    }
}

impl HawserConfig {
    /// Load the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// The pipeline tuning derived from this file.
    pub fn mirror_config(&self) -> MirrorConfig {
        MirrorConfig {
            environment: self.environment,
            genesis_block: self.chain.genesis_block,
            reconnect_delay: Duration::from_secs(self.connection.reconnect_delay_secs),
            probe_interval: Duration::from_secs(self.connection.probe_interval_secs),
            sweep_interval: Duration::from_secs(self.reconciler.sweep_interval_secs),
            staging_ttl: Duration::from_secs(self.reconciler.ttl_secs),
        }
    }
}
