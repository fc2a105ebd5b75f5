//! Shared fixtures for library integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use marquee_catalog::{Catalog, CatalogError};
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::types::{EntityId, UserId};
use marquee_library::EntityCache;
use marquee_store::MemoryStore;

pub const USER: &str = "user-1";

pub fn user() -> UserId {
    UserId::new(USER)
}

pub fn item(category: Category, id: EntityId, title: &str) -> CatalogItem {
    CatalogItem {
        id,
        category,
        title: title.to_string(),
        year: Some("1995".into()),
        release_date: Some("1995-12-15".into()),
        overview: format!("{title} overview"),
        poster: Some(format!("https://img.test/{id}.jpg")),
        backdrop: None,
        catalog_score: Some(80),
        genres: vec!["Crime".into(), "Drama".into()],
        genre_ids: vec![80, 18],
        cast: vec!["Al Pacino".into()],
        director: Some("Michael Mann".into()),
        runtime: Some(170),
        seasons: None,
    }
}

pub fn store_and_cache() -> (Arc<MemoryStore>, Arc<EntityCache>) {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(EntityCache::new(store.clone()));
    (store, cache)
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within 2s");
}

// ---------------------------------------------------------------------------
// FakeCatalog
// ---------------------------------------------------------------------------

/// In-memory [`Catalog`] with scripted results.
#[derive(Default)]
pub struct FakeCatalog {
    details: Mutex<HashMap<(Category, EntityId), CatalogItem>>,
    searches: Mutex<HashMap<String, Vec<CatalogItem>>>,
    failing_details: Mutex<HashSet<EntityId>>,
    search_delay: Mutex<Duration>,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detail(self, detail: CatalogItem) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert((detail.category, detail.id), detail);
        self
    }

    pub fn with_search(self, query: &str, results: Vec<CatalogItem>) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    pub fn failing_detail(self, id: EntityId) -> Self {
        self.failing_details.lock().unwrap().insert(id);
        self
    }

    pub fn with_search_delay(self, delay: Duration) -> Self {
        *self.search_delay.lock().unwrap() = delay;
        self
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search(
        &self,
        _category: Category,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.search_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .searches
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn details(&self, category: Category, id: EntityId) -> Result<CatalogItem, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.lock().unwrap().contains(&id) {
            return Err(CatalogError::Api {
                status: 500,
                body: "boom".into(),
            });
        }
        self.details
            .lock()
            .unwrap()
            .get(&(category, id))
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                body: "not found".into(),
            })
    }

    async fn trending(&self, _category: Category) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(Vec::new())
    }
}
