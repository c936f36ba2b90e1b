use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use hawser_types::CanonicalAddress;

use crate::error::StoreResult;
use crate::traits::ContentNetwork;

/// The sha2-256 multihash address for `data`.
pub fn content_address(data: &[u8]) -> CanonicalAddress {
    let digest: [u8; 32] = Sha256::digest(data).into();
    hawser_codec::multihash::sha2_256_address(&digest)
}

/// In-memory content-addressable network.
///
/// Addresses are sha2-256 multihashes of the stored bytes, minted through
/// the codec, so they match what producers compute when staging.
#[derive(Default)]
pub struct MemoryNetwork {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// The address `data` would be stored under, without storing it.
    pub fn address_of(data: &[u8]) -> CanonicalAddress {
        content_address(data)
    }

    /// Whether an object is stored under `address`.
    pub fn contains(&self, address: &CanonicalAddress) -> bool {
        self.objects
            .read()
            .expect("network lock poisoned")
            .contains_key(address.as_str())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().expect("network lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentNetwork for MemoryNetwork {
    async fn add(&self, data: &[u8]) -> StoreResult<CanonicalAddress> {
        let address = Self::address_of(data);
        self.objects
            .write()
            .expect("network lock poisoned")
            .insert(address.as_str().to_string(), data.to_vec());
        Ok(address)
    }
}

/// Filesystem content-addressable network: one immutable object file per
/// address under the store root.
pub struct FsNetwork {
    root: PathBuf,
}

impl FsNetwork {
    /// Open the object store rooted at `root`, creating the directory if
    /// needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The object directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, address: &CanonicalAddress) -> PathBuf {
        self.root.join(address.as_str())
    }

    /// Whether an object exists under `address`.
    pub fn contains(&self, address: &CanonicalAddress) -> bool {
        self.path_for(address).is_file()
    }
}

#[async_trait]
impl ContentNetwork for FsNetwork {
    async fn add(&self, data: &[u8]) -> StoreResult<CanonicalAddress> {
        let address = content_address(data);
        let path = self.path_for(&address);
        // Objects are immutable; an existing file is already this content.
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, data).await?;
        }
        Ok(address)
    }
}
