//! Bidirectional codec between on-chain content references and canonical
//! storage addresses.
//!
//! The codec is pure and stateless: [`encode`] maps a
//! [`ContentReference`](hawser_types::ContentReference) to its base58
//! multihash address, [`decode`] recovers the reference from the address.
//! For every supported reference, `decode(encode(r)) == r`.
//!
//! This crate owns the single definition of which storage engines are
//! supported ([`StorageEngine`]); everything else in the system treats the
//! engine tag as opaque.

pub mod base58;
pub mod error;
pub mod multihash;

pub use error::{CodecError, CodecResult};
pub use multihash::{decode, encode, StorageEngine, SHA2_256};
