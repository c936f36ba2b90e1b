use std::fmt;

use serde::{Deserialize, Serialize};

/// Multihash fields of a content reference as recorded on the ledger.
///
/// `hash_function` is the multihash function code (0x12 for sha2-256),
/// `size` is the declared digest length in bytes, and `storage_engine` is
/// the raw engine tag from the contract. The tag is kept uninterpreted
/// here; the codec is the only place that decides which engines are
/// supported and whether the declared size agrees with the digest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentReference {
    /// Multihash function code.
    pub hash_function: u8,
    /// Raw digest bytes.
    #[serde(with = "hex_bytes")]
    pub digest: Vec<u8>,
    /// Declared digest length in bytes.
    pub size: u8,
    /// Raw storage-engine tag from the contract.
    pub storage_engine: u8,
}

impl ContentReference {
    /// Hex form of the digest, for logging and fixtures.
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

impl fmt::Debug for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentReference")
            .field("hash_function", &format_args!("{:#04x}", self.hash_function))
            .field("digest", &self.digest_hex())
            .field("size", &self.size)
            .field("storage_engine", &self.storage_engine)
            .finish()
    }
}

/// Serialize digest bytes as a lowercase hex string.
///
/// Keeps feed files and logs readable instead of emitting JSON byte arrays.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
