use std::time::Duration;

/// Library/session tuning loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Delay between sign-in and the backfill pass (default: 3 s).
    pub backfill_delay: Duration,
    /// Whether the backfill pass runs at all (default: `true`).
    pub backfill_enabled: bool,
    /// Quiet period before a catalog search is dispatched (default: 300 ms).
    pub search_quiet_period: Duration,
}

impl LibraryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default |
    /// |---------------------|---------|
    /// | `BACKFILL_DELAY_MS` | `3000`  |
    /// | `BACKFILL_ENABLED`  | `true`  |
    /// | `SEARCH_DEBOUNCE_MS`| `300`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backfill_delay: env_millis("BACKFILL_DELAY_MS").unwrap_or(defaults.backfill_delay),
            backfill_enabled: std::env::var("BACKFILL_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backfill_enabled),
            search_quiet_period: env_millis("SEARCH_DEBOUNCE_MS")
                .unwrap_or(defaults.search_quiet_period),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            backfill_delay: Duration::from_secs(3),
            backfill_enabled: true,
            search_quiet_period: Duration::from_millis(300),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}
