//! Remote real-time document store boundary.
//!
//! - [`RemoteStore`] — the four primitives the cache depends on
//!   (live subscribe, set, partial update, delete).
//! - [`Subscription`] — an initial [`Snapshot`] followed by a stream of
//!   full-replacement snapshots.
//! - [`MemoryStore`] — in-process implementation with live fan-out,
//!   used by the server's local mode and by tests.
//! - [`paths`] — per-user collection and document naming.

pub mod memory;
pub mod paths;
pub mod remote;
pub mod snapshot;

pub use memory::MemoryStore;
pub use remote::{RemoteStore, StoreError};
pub use snapshot::{Document, Snapshot, Subscription};
