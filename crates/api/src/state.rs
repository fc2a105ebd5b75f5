use std::sync::Arc;

use marquee_library::Session;
use marquee_recommend::RecommendationPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The signed-in session: entity cache, catalog, search and backfill.
    pub session: Arc<Session>,
    /// Recommendation pipeline (generator + catalog resolution).
    pub pipeline: Arc<RecommendationPipeline>,
}
