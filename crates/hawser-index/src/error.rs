use thiserror::Error;

/// Errors from checkpoint or transient-index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backing store failed.
    #[error("index backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded.
    #[error("corrupt index value for {key}: {reason}")]
    CorruptValue { key: String, reason: String },
}

impl From<sled::Error> for IndexError {
    fn from(err: sled::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
