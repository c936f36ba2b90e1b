//! Hawser core: keeps a content-addressable store consistent with an
//! append-only ledger of content references.
//!
//! Three cooperating activities share one [`MirrorContext`] and converge
//! through durable state only:
//!
//! - The [`Supervisor`] owns the connection lifecycle: connect, run the
//!   watcher, detect loss, reconnect after a fixed delay. In development
//!   environments a lost connection also invalidates the checkpoint,
//!   because the backing ledger was reset.
//! - The [`EventWatcher`] consumes the live event stream from the
//!   checkpoint forward, mirrors each referenced file out of staging into
//!   the content network, clears its transient record, and advances the
//!   checkpoint (max-merge) past events whose mirror succeeded.
//! - The [`Reconciler`] periodically sweeps transient records older than
//!   the staging TTL and purges them only after a full-history
//!   re-verification fails to confirm them; confirmed records are mirrored
//!   instead.
//!
//! Every durable mutation is idempotent and order-tolerant, so the
//! activities need no locks between them and any step is safe to interrupt
//! and resume.

pub mod config;
pub mod context;
#[cfg(test)]
pub(crate) mod testutil;
pub mod error;
pub mod reconciler;
pub mod step;
pub mod supervisor;
pub mod watcher;

pub use config::{Environment, MirrorConfig};
pub use context::MirrorContext;
pub use error::{MirrorError, MirrorResult};
pub use reconciler::{Reconciler, SweepReport};
pub use step::{mirror_staged, MirrorOutcome};
pub use supervisor::{ConnectionState, Supervisor};
pub use watcher::EventWatcher;
