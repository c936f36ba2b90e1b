use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::CanonicalAddress;

/// Bookkeeping entry for a staged file awaiting mirror or purge.
///
/// A record is created when a producer stages a file and deleted by exactly
/// one of two paths: the live watcher after a successful mirror, or the
/// reconciler after a full-history re-verification came up empty. Never
/// both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientFileRecord {
    /// Storage key of the staged file.
    pub address: CanonicalAddress,
    /// When the file was staged.
    pub uploaded_at: DateTime<Utc>,
}

impl TransientFileRecord {
    pub fn new(address: CanonicalAddress, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            address,
            uploaded_at,
        }
    }

    /// Whether this record was staged at or before `cutoff`.
    pub fn expired_at(&self, cutoff: DateTime<Utc>) -> bool {
        self.uploaded_at <= cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_inclusive_of_the_cutoff() {
        let now = Utc::now();
        let record = TransientFileRecord::new(CanonicalAddress::new("QmX"), now);
        assert!(record.expired_at(now));
        assert!(record.expired_at(now + Duration::seconds(1)));
        assert!(!record.expired_at(now - Duration::seconds(1)));
    }
}
