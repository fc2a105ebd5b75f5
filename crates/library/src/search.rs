//! Debounced, latest-wins catalog search.
//!
//! Catalog calls cannot be cancelled once dispatched. Each call to
//! [`SearchCoordinator::search`] issues a [`RequestToken`], waits out the
//! quiet period, and only dispatches if no newer search arrived in the
//! meantime. A response that comes back after a newer token was issued is
//! discarded.
//!
//! [`RequestToken`]: marquee_core::sequencing::RequestToken

use std::sync::Arc;
use std::time::Duration;

use marquee_catalog::{Catalog, CatalogError};
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::sequencing::RequestSequencer;

/// Result of a coordinated search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<CatalogItem>),
    /// A newer search superseded this one.
    Superseded,
}

pub struct SearchCoordinator {
    catalog: Arc<dyn Catalog>,
    sequencer: RequestSequencer,
    quiet_period: Duration,
}

impl SearchCoordinator {
    pub fn new(catalog: Arc<dyn Catalog>, quiet_period: Duration) -> Self {
        Self {
            catalog,
            sequencer: RequestSequencer::new(),
            quiet_period,
        }
    }

    /// Search `category` for `query`.
    ///
    /// A blank query still supersedes earlier searches but returns an
    /// empty result without dispatching.
    pub async fn search(
        &self,
        category: Category,
        query: &str,
    ) -> Result<SearchOutcome, CatalogError> {
        let token = self.sequencer.issue();
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::Results(Vec::new()));
        }

        tokio::time::sleep(self.quiet_period).await;
        if !self.sequencer.is_current(token) {
            return Ok(SearchOutcome::Superseded);
        }

        let results = self.catalog.search(category, query).await?;
        if !self.sequencer.is_current(token) {
            tracing::debug!(%category, query, token = token.value(), "Discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(results))
    }
}
