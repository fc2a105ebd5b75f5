//! Shared harness for API integration tests.
//!
//! Requests go straight to the router via `tower::ServiceExt::oneshot`,
//! with an in-memory store and scripted catalog / generator.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use marquee_api::config::ServerConfig;
use marquee_api::router::build_app_router;
use marquee_api::state::AppState;
use marquee_catalog::{Catalog, CatalogError};
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::types::EntityId;
use marquee_library::{LibraryConfig, Session};
use marquee_recommend::{GenerationError, RecommendationPipeline, TextGenerator};
use marquee_store::MemoryStore;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        listen: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout: Duration::from_secs(30),
        shutdown_timeout: Duration::from_secs(5),
    }
}

pub fn item(category: Category, id: EntityId, title: &str) -> CatalogItem {
    CatalogItem {
        id,
        category,
        title: title.to_string(),
        year: Some("1995".into()),
        release_date: Some("1995-12-15".into()),
        overview: String::new(),
        poster: None,
        backdrop: None,
        catalog_score: Some(80),
        genres: vec!["Crime".into()],
        genre_ids: vec![80],
        cast: Vec::new(),
        director: None,
        runtime: None,
        seasons: None,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Catalog where every search returns the same results.
pub struct StaticCatalog {
    pub results: Vec<CatalogItem>,
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn search(
        &self,
        _category: Category,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self
            .results
            .iter()
            .filter(|i| i.title.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect())
    }

    async fn details(&self, _category: Category, id: EntityId) -> Result<CatalogItem, CatalogError> {
        self.results
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::Unusable(format!("no item {id}")))
    }

    async fn trending(&self, _category: Category) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.results.clone())
    }
}

/// Generator returning a fixed reply, or failing when `reply` is `None`.
pub struct FixedGenerator {
    pub reply: Mutex<Option<String>>,
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, GenerationError> {
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or(GenerationError::Api {
                status: 500,
                body: "down".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<FixedGenerator>,
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(StaticCatalog {
        results: vec![
            item(Category::Movie, 949, "Heat"),
            item(Category::Movie, 11524, "Thief"),
            item(Category::Movie, 1538, "Collateral"),
        ],
    });
    let generator = Arc::new(FixedGenerator {
        reply: Mutex::new(None),
    });
    let library_config = LibraryConfig {
        backfill_delay: Duration::ZERO,
        backfill_enabled: false,
        search_quiet_period: Duration::from_millis(1),
    };

    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        session: Arc::new(Session::new(store.clone(), catalog.clone(), library_config)),
        pipeline: Arc::new(RecommendationPipeline::new(generator.clone(), catalog)),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        store,
        generator,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sign in through the API.
    pub async fn sign_in(&self, user_id: &str) {
        let response = self
            .put_json("/api/v1/session", serde_json::json!({ "userId": user_id }))
            .await;
        assert!(response.status().is_success());
    }

    /// Poll until the cache satisfies `condition`.
    pub async fn wait_for(&self, condition: impl Fn(&AppState) -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition(&self.state) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("cache did not converge within 2s");
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
