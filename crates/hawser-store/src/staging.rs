use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use hawser_types::CanonicalAddress;

use crate::error::StoreResult;
use crate::traits::StagingArea;

/// Filesystem staging area: one file per address, directly under the
/// staging directory. Base58 addresses contain no path separators, so the
/// address string is the file name.
pub struct FsStaging {
    root: PathBuf,
}

impl FsStaging {
    /// Open the staging area rooted at `root`, creating the directory if
    /// needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The staging directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, address: &CanonicalAddress) -> PathBuf {
        self.root.join(address.as_str())
    }

    /// Write a staged file. Producers call this; the pipeline only reads
    /// and deletes.
    pub async fn stage(&self, address: &CanonicalAddress, data: &[u8]) -> StoreResult<()> {
        tokio::fs::write(self.path_for(address), data).await?;
        Ok(())
    }
}

#[async_trait]
impl StagingArea for FsStaging {
    async fn exists(&self, address: &CanonicalAddress) -> StoreResult<bool> {
        Ok(tokio::fs::try_exists(self.path_for(address)).await?)
    }

    async fn read(&self, address: &CanonicalAddress) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(address)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, address: &CanonicalAddress) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(address)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory staging area for tests and embedding.
#[derive(Default)]
pub struct MemoryStaging {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a staged file.
    pub fn stage(&self, address: &CanonicalAddress, data: &[u8]) {
        self.files
            .write()
            .expect("staging lock poisoned")
            .insert(address.as_str().to_string(), data.to_vec());
    }

    /// Number of staged files.
    pub fn len(&self) -> usize {
        self.files.read().expect("staging lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StagingArea for MemoryStaging {
    async fn exists(&self, address: &CanonicalAddress) -> StoreResult<bool> {
        Ok(self
            .files
            .read()
            .expect("staging lock poisoned")
            .contains_key(address.as_str()))
    }

    async fn read(&self, address: &CanonicalAddress) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .files
            .read()
            .expect("staging lock poisoned")
            .get(address.as_str())
            .cloned())
    }

    async fn remove(&self, address: &CanonicalAddress) -> StoreResult<()> {
        self.files
            .write()
            .expect("staging lock poisoned")
            .remove(address.as_str());
        Ok(())
    }
}
