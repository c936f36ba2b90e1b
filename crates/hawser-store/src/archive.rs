use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use hawser_types::CanonicalAddress;

use crate::error::StoreResult;
use crate::traits::ArchiveStore;

/// In-memory stand-in for the durable object store producers upload into.
#[derive(Default)]
pub struct MemoryArchive {
    objects: RwLock<HashSet<String>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archived object (a producer upload).
    pub fn put(&self, address: &CanonicalAddress) {
        self.objects
            .write()
            .expect("archive lock poisoned")
            .insert(address.as_str().to_string());
    }

    /// Whether an object exists under `address`.
    pub fn contains(&self, address: &CanonicalAddress) -> bool {
        self.objects
            .read()
            .expect("archive lock poisoned")
            .contains(address.as_str())
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn delete(&self, address: &CanonicalAddress) -> StoreResult<()> {
        self.objects
            .write()
            .expect("archive lock poisoned")
            .remove(address.as_str());
        Ok(())
    }
}

/// Archive that fails every delete — for exercising best-effort cleanup
/// paths in tests.
#[derive(Default)]
pub struct FailingArchive;

#[async_trait]
impl ArchiveStore for FailingArchive {
    async fn delete(&self, _address: &CanonicalAddress) -> StoreResult<()> {
        Err(crate::error::StoreError::Backend(
            "archive unavailable".into(),
        ))
    }
}
