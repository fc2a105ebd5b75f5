//! Explicit session context.
//!
//! Owns everything that lives for one signed-in identity: the cache
//! binding and the pending backfill pass. Signing in again cancels the
//! previous session's backfill before rebinding.

use std::sync::Arc;

use marquee_catalog::Catalog;
use marquee_core::profile::{build_profile, TasteProfile};
use marquee_core::types::UserId;
use marquee_store::RemoteStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backfill::{self, BackfillReport};
use crate::cache::{CacheError, EntityCache};
use crate::config::LibraryConfig;
use crate::search::SearchCoordinator;

struct PendingBackfill {
    cancel: CancellationToken,
    handle: JoinHandle<Option<BackfillReport>>,
}

pub struct Session {
    cache: Arc<EntityCache>,
    catalog: Arc<dyn Catalog>,
    search: SearchCoordinator,
    config: LibraryConfig,
    backfill: Mutex<Option<PendingBackfill>>,
}

impl Session {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        catalog: Arc<dyn Catalog>,
        config: LibraryConfig,
    ) -> Self {
        Self {
            cache: Arc::new(EntityCache::new(store)),
            search: SearchCoordinator::new(Arc::clone(&catalog), config.search_quiet_period),
            catalog,
            config,
            backfill: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    /// Bind `user` and schedule this session's backfill pass.
    pub async fn sign_in(&self, user: UserId) -> Result<(), CacheError> {
        let mut pending = self.backfill.lock().await;
        cancel_backfill(pending.take()).await;

        self.cache.bind(Some(user.clone())).await?;

        if self.config.backfill_enabled {
            let cancel = CancellationToken::new();
            let handle = backfill::spawn_after(
                self.config.backfill_delay,
                Arc::clone(&self.cache),
                Arc::clone(&self.catalog),
                cancel.clone(),
            );
            *pending = Some(PendingBackfill { cancel, handle });
            tracing::debug!(user_id = %user, delay_ms = self.config.backfill_delay.as_millis() as u64, "Backfill scheduled");
        }
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), CacheError> {
        let mut pending = self.backfill.lock().await;
        cancel_backfill(pending.take()).await;
        self.cache.bind(None).await
    }

    /// Wait for the scheduled backfill pass, if any, and return its report.
    pub async fn wait_for_backfill(&self) -> Option<BackfillReport> {
        let pending = self.backfill.lock().await.take()?;
        pending.handle.await.ok().flatten()
    }

    /// Taste profile of the bound user, built fresh from the cache.
    pub fn profile(&self) -> TasteProfile {
        build_profile(&self.cache.all_records(), &self.cache.taste_notes())
    }

    /// Cancel pending work and close every subscription.
    pub async fn shutdown(&self) {
        let mut pending = self.backfill.lock().await;
        cancel_backfill(pending.take()).await;
        self.cache.shutdown().await;
        tracing::info!("Session shut down");
    }
}

async fn cancel_backfill(pending: Option<PendingBackfill>) {
    if let Some(pending) = pending {
        pending.cancel.cancel();
        let _ = pending.handle.await;
    }
}
