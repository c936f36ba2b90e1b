use thiserror::Error;

/// Errors from content storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Address encoding failed while minting a content address.
    #[error("codec error: {0}")]
    Codec(#[from] hawser_codec::CodecError),

    /// The backend refused or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
