//! HTTP catalog client.
//!
//! Wraps the catalog REST API (search, detail, trending) using
//! [`reqwest`]. Every response is normalized before it leaves this crate.

use std::time::Duration;

use async_trait::async_trait;
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::types::EntityId;

use crate::normalize::{normalize_item, normalize_results, DEFAULT_IMAGE_BASE};
use crate::query::CatalogQuery;

/// HTTP request timeout for a single catalog call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the catalog layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog returned a non-2xx status code.
    #[error("Catalog API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed but did not describe a usable item.
    #[error("Unusable catalog response: {0}")]
    Unusable(String),
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Read-only access to the media catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Title search restricted to one category, best match first.
    async fn search(&self, category: Category, query: &str)
        -> Result<Vec<CatalogItem>, CatalogError>;

    /// Full detail for one item, including credits.
    async fn details(&self, category: Category, id: EntityId) -> Result<CatalogItem, CatalogError>;

    /// This week's trending items.
    async fn trending(&self, category: Category) -> Result<Vec<CatalogItem>, CatalogError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Catalog connection settings.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API base URL (default: `https://api.themoviedb.org/3`).
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_token: String,
    /// Image CDN base for poster and backdrop URLs.
    pub image_base: String,
    /// Response language (default: `en-US`).
    pub language: String,
}

impl CatalogConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                          |
    /// |-----------------------|----------------------------------|
    /// | `CATALOG_BASE_URL`    | `https://api.themoviedb.org/3`   |
    /// | `CATALOG_API_TOKEN`   | empty                            |
    /// | `CATALOG_IMAGE_BASE`  | `https://image.tmdb.org/t/p`     |
    /// | `CATALOG_LANGUAGE`    | `en-US`                          |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org/3".into()),
            api_token: std::env::var("CATALOG_API_TOKEN").unwrap_or_default(),
            image_base: std::env::var("CATALOG_IMAGE_BASE")
                .unwrap_or_else(|_| DEFAULT_IMAGE_BASE.into()),
            language: std::env::var("CATALOG_LANGUAGE").unwrap_or_else(|_| "en-US".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// TmdbCatalog
// ---------------------------------------------------------------------------

/// [`Catalog`] backed by the TMDB v3 REST API (or a proxy speaking it).
pub struct TmdbCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl TmdbCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Create a catalog client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    /// Execute a raw query and return the JSON body.
    pub async fn fetch(&self, query: &CatalogQuery) -> Result<serde_json::Value, CatalogError> {
        let mut request = self
            .client
            .get(format!("{}{}", self.config.base_url, query.path))
            .query(&query.params)
            .query(&[("language", self.config.language.as_str())]);
        if !self.config.api_token.is_empty() {
            request = request.bearer_auth(&self.config.api_token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Catalog for TmdbCatalog {
    async fn search(
        &self,
        category: Category,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let raw = self.fetch(&CatalogQuery::search(category, query)).await?;
        let items = normalize_results(category, &raw, &self.config.image_base);
        tracing::debug!(%category, query, results = items.len(), "Catalog search");
        Ok(items)
    }

    async fn details(&self, category: Category, id: EntityId) -> Result<CatalogItem, CatalogError> {
        let raw = self.fetch(&CatalogQuery::details(category, id)).await?;
        normalize_item(category, &raw, &self.config.image_base)
            .ok_or_else(|| CatalogError::Unusable(format!("detail for {category}/{id} carries no id")))
    }

    async fn trending(&self, category: Category) -> Result<Vec<CatalogItem>, CatalogError> {
        let raw = self.fetch(&CatalogQuery::trending(category)).await?;
        Ok(normalize_results(category, &raw, &self.config.image_base))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
