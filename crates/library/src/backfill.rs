//! Backfill reconciliation.
//!
//! Older library entries may lack fields the catalog started returning
//! later (score, genres, release date). Once per session the backfill
//! pass fetches detail for every such entry and writes only the missing
//! descriptive fields. User-owned fields are never part of the patch.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use marquee_catalog::Catalog;
use marquee_core::category::Category;
use marquee_core::entity::{DescriptivePatch, EntityRecord};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::EntityCache;

/// Maximum concurrent catalog detail fetches.
const BACKFILL_CONCURRENCY: usize = 4;

/// Counts from one backfill pass, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Records that were missing at least one field.
    pub candidates: usize,
    /// Records a patch was written for.
    pub patched: usize,
    /// Records the catalog had nothing new for.
    pub unchanged: usize,
    /// Records whose fetch or write failed.
    pub failed: usize,
}

enum ItemResult {
    Patched,
    Unchanged,
    Failed,
}

/// Run one pass over every cached record that needs backfill.
///
/// Per-item failures are logged and counted, never propagated. The
/// records are read from the cache once at the start.
pub async fn run(cache: &EntityCache, catalog: &dyn Catalog) -> BackfillReport {
    let candidates: Vec<EntityRecord> = Category::ALL
        .iter()
        .flat_map(|&c| cache.all(c))
        .filter(EntityRecord::needs_backfill)
        .collect();

    let mut report = BackfillReport {
        candidates: candidates.len(),
        ..BackfillReport::default()
    };
    if candidates.is_empty() {
        return report;
    }

    let results: Vec<ItemResult> = stream::iter(candidates)
        .map(|record| async move { backfill_one(cache, catalog, &record).await })
        .buffer_unordered(BACKFILL_CONCURRENCY)
        .collect()
        .await;

    for result in results {
        match result {
            ItemResult::Patched => report.patched += 1,
            ItemResult::Unchanged => report.unchanged += 1,
            ItemResult::Failed => report.failed += 1,
        }
    }

    tracing::info!(
        candidates = report.candidates,
        patched = report.patched,
        unchanged = report.unchanged,
        failed = report.failed,
        "Backfill pass complete",
    );
    report
}

async fn backfill_one(
    cache: &EntityCache,
    catalog: &dyn Catalog,
    record: &EntityRecord,
) -> ItemResult {
    let detail = match catalog.details(record.category, record.id).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::debug!(
                category = %record.category,
                id = record.id,
                error = %e,
                "Backfill detail fetch failed",
            );
            return ItemResult::Failed;
        }
    };

    let patch = DescriptivePatch::fill_missing(record, &detail);
    if patch.is_empty() {
        return ItemResult::Unchanged;
    }

    match cache.patch(record.category, record.id, &patch).await {
        Ok(true) => ItemResult::Patched,
        Ok(false) => ItemResult::Unchanged,
        Err(e) => {
            tracing::warn!(
                category = %record.category,
                id = record.id,
                error = %e,
                "Backfill write failed",
            );
            ItemResult::Failed
        }
    }
}

/// Run [`run`] after `delay` on a background task.
///
/// Cancelling `cancel` stops the pass wherever it is (waiting or mid-run)
/// and the task returns `None`.
pub fn spawn_after(
    delay: Duration,
    cache: Arc<EntityCache>,
    catalog: Arc<dyn Catalog>,
    cancel: CancellationToken,
) -> JoinHandle<Option<BackfillReport>> {
    tokio::spawn(async move {
        let pass = async {
            tokio::time::sleep(delay).await;
            run(&cache, catalog.as_ref()).await
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Backfill cancelled");
                None
            }
            report = pass => Some(report),
        }
    })
}
