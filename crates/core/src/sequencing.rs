//! Monotonic request tokens for discarding stale async responses.
//!
//! None of the collaborator calls can be cancelled in flight. A caller
//! issues a token before dispatching and, when the response arrives,
//! drops it unless the token is still the latest one issued.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one dispatched request. Later tokens compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues [`RequestToken`]s and answers "is this still the newest?".
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer token has been issued since `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}
