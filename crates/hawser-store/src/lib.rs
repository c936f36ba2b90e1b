//! Content storage interfaces for Hawser.
//!
//! Three capability traits cover everything the pipeline touches besides
//! the ledger and the bookkeeping index:
//!
//! - [`ContentNetwork`] — the durable content-addressable network files are
//!   mirrored into; `add` returns a content-derived address the caller can
//!   verify independently.
//! - [`StagingArea`] — the ephemeral upload area files wait in until their
//!   on-chain reference arrives.
//! - [`ArchiveStore`] — the durable object store that holds producer
//!   uploads; only its delete surface is needed here.
//!
//! [`FsStaging`] is the filesystem staging backend (one file per address);
//! the in-memory implementations serve tests and embedding.

pub mod archive;
pub mod error;
pub mod network;
pub mod staging;
pub mod traits;

pub use archive::{FailingArchive, MemoryArchive};
pub use error::{StoreError, StoreResult};
pub use network::{content_address, FsNetwork, MemoryNetwork};
pub use staging::{FsStaging, MemoryStaging};
pub use traits::{ArchiveStore, ContentNetwork, StagingArea};
