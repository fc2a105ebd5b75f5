//! One recommendation request, end to end.
//!
//! States run strictly forward: the profile and category are captured by
//! the caller, the generator is called once, its reply is extracted and
//! classified, and each pick is resolved against the catalog. Extraction
//! and classification failures end the request; resolution failures only
//! leave a pick unresolved.

use std::sync::Arc;

use futures::future::join_all;
use marquee_catalog::Catalog;
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::profile::TasteProfile;
use marquee_core::response::{parse_response, ModelResponse, Pick, ResponseError};
use serde::Serialize;

use crate::generator::{GenerationError, TextGenerator};
use crate::prompt::{user_message, SYSTEM_INSTRUCTION};

/// Errors fatal to a single recommendation request.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The generator call itself failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The reply could not be extracted or classified.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// A pick plus the catalog item it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPick {
    #[serde(flatten)]
    pub pick: Pick,
    pub catalog_item: Option<CatalogItem>,
}

/// Result of a successful request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PipelineOutcome {
    /// Picks in the order the generator returned them.
    Recommendations { items: Vec<ResolvedPick> },
    Answer { heading: String, text: String },
}

pub struct RecommendationPipeline {
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<dyn Catalog>,
}

impl RecommendationPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<dyn Catalog>) -> Self {
        Self { generator, catalog }
    }

    /// Run one request against a captured `profile` for `category`.
    pub async fn run(
        &self,
        profile: &TasteProfile,
        category: Category,
        request: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let user = user_message(profile, category, request);
        let raw = self.generator.generate(SYSTEM_INSTRUCTION, &user).await?;

        match parse_response(&raw) {
            Ok(ModelResponse::Recommendations(picks)) => {
                tracing::info!(%category, picks = picks.len(), "Generator returned recommendations");
                let items = self.resolve(category, picks).await;
                Ok(PipelineOutcome::Recommendations { items })
            }
            Ok(ModelResponse::Answer { heading, text }) => {
                tracing::info!(%category, "Generator returned an answer");
                Ok(PipelineOutcome::Answer { heading, text })
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, reply_len = raw.len(), "Unusable generator reply");
                Err(e.into())
            }
        }
    }

    /// Resolve every pick concurrently; order is preserved.
    ///
    /// The search is restricted to the requested category regardless of
    /// the category the generator attached to the pick. The first result
    /// wins. No result or a failed search leaves the pick unresolved.
    pub async fn resolve(&self, category: Category, picks: Vec<Pick>) -> Vec<ResolvedPick> {
        let lookups = picks.iter().map(|pick| self.resolve_one(category, &pick.title));
        let items = join_all(lookups).await;

        picks
            .into_iter()
            .zip(items)
            .map(|(pick, catalog_item)| ResolvedPick { pick, catalog_item })
            .collect()
    }

    async fn resolve_one(&self, category: Category, title: &str) -> Option<CatalogItem> {
        match self.catalog.search(category, title).await {
            Ok(results) => {
                let first = results.into_iter().next();
                if first.is_none() {
                    tracing::warn!(%category, title, "No catalog match for pick");
                }
                first
            }
            Err(e) => {
                tracing::warn!(%category, title, error = %e, "Pick resolution failed");
                None
            }
        }
    }
}
