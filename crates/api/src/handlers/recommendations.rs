use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use marquee_recommend::{annotate, AnnotatedPick, PipelineOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::parse_category;
use crate::response::envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub category: String,
    /// Free-text request; blank asks for general recommendations.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecommendResponse {
    Recommendations { items: Vec<AnnotatedPick> },
    Answer { heading: String, text: String },
}

/// POST /api/v1/recommendations
///
/// Snapshot the taste profile, run the pipeline and annotate the resolved
/// picks with current library membership.
pub async fn recommend(
    State(state): State<AppState>,
    Json(input): Json<RecommendRequest>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&input.category)?;
    let profile = state.session.profile();

    let data = match state.pipeline.run(&profile, category, &input.prompt).await? {
        PipelineOutcome::Recommendations { items } => RecommendResponse::Recommendations {
            items: annotate(state.session.cache(), category, &items),
        },
        PipelineOutcome::Answer { heading, text } => RecommendResponse::Answer { heading, text },
    };
    Ok(envelope(data))
}
