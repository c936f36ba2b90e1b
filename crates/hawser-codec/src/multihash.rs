//! Multihash framing and the canonical-address mapping.
//!
//! A canonical address is `base58([hash_function, size] ++ digest)`. The
//! declared size must match the digest length; a reference whose engine tag
//! is not a [`StorageEngine`] is rejected before anything else is touched.

use hawser_types::{CanonicalAddress, ContentReference};

use crate::base58;
use crate::error::{CodecError, CodecResult};

/// Multihash function code for sha2-256, the canonical digest here.
pub const SHA2_256: u8 = 0x12;

/// Storage engines this system can mirror into.
///
/// The single source of truth for "supported": every other crate passes the
/// raw tag through and lets [`StorageEngine::from_code`] decide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageEngine {
    /// IPFS-style content-addressable network.
    Ipfs,
}

impl StorageEngine {
    /// The on-chain tag value for this engine.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ipfs => 1,
        }
    }

    /// Resolve a raw tag; `None` for engines this system does not serve.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ipfs),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ipfs => write!(f, "ipfs"),
        }
    }
}

/// Encode a content reference into its canonical address.
///
/// Fails cleanly, mutating nothing, when the engine tag is unsupported, the
/// digest is empty, or the declared size disagrees with the digest length.
pub fn encode(reference: &ContentReference) -> CodecResult<CanonicalAddress> {
    StorageEngine::from_code(reference.storage_engine)
        .ok_or(CodecError::UnsupportedEngine(reference.storage_engine))?;
    if reference.digest.is_empty() {
        return Err(CodecError::EmptyDigest);
    }
    if reference.digest.len() != reference.size as usize {
        return Err(CodecError::SizeMismatch {
            declared: reference.size,
            actual: reference.digest.len(),
        });
    }

    let mut bytes = Vec::with_capacity(2 + reference.digest.len());
    bytes.push(reference.hash_function);
    bytes.push(reference.size);
    bytes.extend_from_slice(&reference.digest);
    Ok(CanonicalAddress::new(base58::encode(&bytes)))
}

/// Decode a canonical address back into its content reference.
///
/// The size comes from the multihash header; the engine is the one engine
/// addresses are ever minted for.
pub fn decode(address: &str) -> CodecResult<ContentReference> {
    let bytes = base58::decode(address)?;
    if bytes.len() < 3 {
        return Err(CodecError::TruncatedAddress(bytes.len()));
    }
    let hash_function = bytes[0];
    let size = bytes[1];
    let digest = bytes[2..].to_vec();
    if digest.len() != size as usize {
        return Err(CodecError::SizeMismatch {
            declared: size,
            actual: digest.len(),
        });
    }
    Ok(ContentReference {
        hash_function,
        digest,
        size,
        storage_engine: StorageEngine::Ipfs.code(),
    })
}

/// Mint the canonical address for a raw sha2-256 digest.
///
/// Used by content networks that compute the digest themselves.
pub fn sha2_256_address(digest: &[u8; 32]) -> CanonicalAddress {
    let mut bytes = Vec::with_capacity(34);
    bytes.push(SHA2_256);
    bytes.push(32);
    bytes.extend_from_slice(digest);
    CanonicalAddress::new(base58::encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(digest: Vec<u8>) -> ContentReference {
        let size = digest.len() as u8;
        ContentReference {
            hash_function: SHA2_256,
            digest,
            size,
            storage_engine: StorageEngine::Ipfs.code(),
        }
    }

    #[test]
    fn roundtrip_sha2_reference() {
        let r = reference(vec![0xab; 32]);
        let address = encode(&r).unwrap();
        assert_eq!(decode(address.as_str()).unwrap(), r);
    }

    #[test]
    fn sha2_addresses_start_with_qm() {
        // 0x12 0x20 prefix is the classic "Qm" address family.
        let address = encode(&reference(vec![7; 32])).unwrap();
        assert!(address.as_str().starts_with("Qm"), "got {address}");
    }

    #[test]
    fn unsupported_engine_is_rejected() {
        let mut r = reference(vec![1; 32]);
        r.storage_engine = 2;
        assert_eq!(encode(&r), Err(CodecError::UnsupportedEngine(2)));
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut r = reference(vec![1; 32]);
        r.size = 20;
        assert_eq!(
            encode(&r),
            Err(CodecError::SizeMismatch {
                declared: 20,
                actual: 32
            })
        );
    }

    #[test]
    fn empty_digest_is_rejected() {
        let r = ContentReference {
            hash_function: SHA2_256,
            digest: Vec::new(),
            size: 0,
            storage_engine: StorageEngine::Ipfs.code(),
        };
        assert_eq!(encode(&r), Err(CodecError::EmptyDigest));
    }

    #[test]
    fn decode_rejects_truncated_addresses() {
        // "2" decodes to the single byte 0x01.
        assert_eq!(decode("2"), Err(CodecError::TruncatedAddress(1)));
    }

    #[test]
    fn decode_rejects_inner_length_disagreement() {
        // Header declares 32 digest bytes but only 2 follow.
        let bytes = vec![SHA2_256, 32, 0xaa, 0xbb];
        let address = crate::base58::encode(&bytes);
        assert!(matches!(
            decode(&address),
            Err(CodecError::SizeMismatch { declared: 32, actual: 2 })
        ));
    }

    #[test]
    fn sha2_256_address_matches_encode() {
        let digest = [0x3c; 32];
        let minted = sha2_256_address(&digest);
        let encoded = encode(&reference(digest.to_vec())).unwrap();
        assert_eq!(minted, encoded);
    }

    #[test]
    fn zero_hash_function_survives_roundtrip() {
        // A leading zero byte exercises base58 leading-'1' handling.
        let r = ContentReference {
            hash_function: 0,
            digest: vec![0xff, 0x00, 0x10],
            size: 3,
            storage_engine: StorageEngine::Ipfs.code(),
        };
        let address = encode(&r).unwrap();
        assert!(address.as_str().starts_with('1'));
        assert_eq!(decode(address.as_str()).unwrap(), r);
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_all_supported_references(
            hash_function in any::<u8>(),
            digest in proptest::collection::vec(any::<u8>(), 1..=64),
        ) {
            let r = ContentReference {
                hash_function,
                size: digest.len() as u8,
                digest,
                storage_engine: StorageEngine::Ipfs.code(),
            };
            let address = encode(&r).unwrap();
            prop_assert_eq!(decode(address.as_str()).unwrap(), r);
        }
    }
}
