use thiserror::Error;

/// Errors from ledger client operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The provider connection could not be established or was refused.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// An operation that needs a live connection was called without one.
    #[error("not connected to the ledger")]
    NotConnected,

    /// A historical query failed.
    #[error("history query failed: {0}")]
    Query(String),

    /// A feed line could not be parsed.
    #[error("malformed event at line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },

    /// I/O error from a file-backed ledger feed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for ledger client operations.
pub type ChainResult<T> = Result<T, ChainError>;
