//! Foundation types for Hawser.
//!
//! This crate provides the data model shared by every other Hawser crate:
//! the on-chain content reference shape, the canonical storage address
//! derived from it, the ledger event envelope, and the bookkeeping record
//! for staged-but-not-yet-mirrored files.
//!
//! # Key Types
//!
//! - [`ContentReference`] — Raw multihash fields as recorded on the ledger
//! - [`CanonicalAddress`] — Base58 address string used as the storage key everywhere
//! - [`ChainEvent`] — A content-reference event delivered by the ledger
//! - [`TransientFileRecord`] — Bookkeeping entry for a staged file awaiting mirror or purge

pub mod address;
pub mod event;
pub mod record;
pub mod reference;

pub use address::CanonicalAddress;
pub use event::ChainEvent;
pub use record::TransientFileRecord;
pub use reference::ContentReference;
