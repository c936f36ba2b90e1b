use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which kind of ledger the process is pointed at.
///
/// Development ledgers are routinely reset; the supervisor treats a lost
/// connection there as a reset and invalidates the checkpoint, since
/// resuming from a stale block against a fresh chain would silently skip
/// or duplicate events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Tuning for the supervisor, watcher, and reconciler.
#[derive(Clone, Debug)]
pub struct MirrorConfig {
    /// Ledger environment the process runs against.
    pub environment: Environment,
    /// Block to watch from when no checkpoint exists.
    pub genesis_block: u64,
    /// Delay between reconnect attempts after a loss.
    pub reconnect_delay: Duration,
    /// Period of the ledger liveness probe.
    pub probe_interval: Duration,
    /// Period of the reconciliation sweep.
    pub sweep_interval: Duration,
    /// Age after which a staged file becomes a purge candidate.
    pub staging_ttl: Duration,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            genesis_block: 0,
            reconnect_delay: Duration::from_secs(10),
            probe_interval: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(600),
            staging_ttl: Duration::from_secs(3600),
        }
    }
}
