use thiserror::Error;

use hawser_types::CanonicalAddress;

/// Errors from the mirror pipeline.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("codec error: {0}")]
    Codec(#[from] hawser_codec::CodecError),

    #[error("chain error: {0}")]
    Chain(#[from] hawser_chain::ChainError),

    #[error("index error: {0}")]
    Index(#[from] hawser_index::IndexError),

    #[error("store error: {0}")]
    Store(#[from] hawser_store::StoreError),

    /// The content network returned a different address than the reference
    /// promised. The staged file and its record stay put for the
    /// reconciler.
    #[error("address mismatch: expected {expected}, network returned {actual}")]
    Integrity {
        expected: CanonicalAddress,
        actual: CanonicalAddress,
    },
}

/// Result alias for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
