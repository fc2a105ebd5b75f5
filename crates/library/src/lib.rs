//! The user's library: a synchronously readable mirror of the remote
//! watchlist plus the processes that keep it tidy.
//!
//! - [`EntityCache`] — per-category collections kept live by store
//!   subscriptions; synchronous reads, asynchronous writes.
//! - [`backfill`] — once-per-session fill-in of missing descriptive fields.
//! - [`SearchCoordinator`] — debounced, latest-wins catalog search.
//! - [`Session`] — explicit session context tying the above together.

pub mod backfill;
pub mod cache;
pub mod config;
pub mod search;
pub mod session;

pub use backfill::BackfillReport;
pub use cache::{AddOutcome, CacheError, CacheScope, EntityCache};
pub use config::LibraryConfig;
pub use search::{SearchCoordinator, SearchOutcome};
pub use session::Session;
