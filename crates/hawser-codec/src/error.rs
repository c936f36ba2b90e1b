use thiserror::Error;

/// Errors from encoding or decoding canonical addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The reference carries a storage-engine tag this system does not serve.
    #[error("unsupported storage engine tag {0:#04x}")]
    UnsupportedEngine(u8),

    /// The declared digest size disagrees with the digest bytes.
    #[error("digest is {actual} bytes but declares size {declared}")]
    SizeMismatch { declared: u8, actual: usize },

    /// The digest is empty.
    #[error("empty digest")]
    EmptyDigest,

    /// The address contains a character outside the base58 alphabet.
    #[error("invalid base58 character {0:?}")]
    InvalidCharacter(char),

    /// The decoded address is too short to hold a multihash header.
    #[error("address decodes to {0} bytes, too short for a multihash")]
    TruncatedAddress(usize),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
