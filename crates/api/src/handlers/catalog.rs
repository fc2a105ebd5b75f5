//! Catalog browsing, annotated with library membership.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use marquee_catalog::Catalog;
use marquee_library::SearchOutcome;
use marquee_recommend::{annotate_items, AnnotatedItem};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::parse_category;
use crate::response::envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub items: Vec<AnnotatedItem>,
    /// A newer search arrived before this one completed; `items` is empty.
    pub superseded: bool,
}

/// GET /api/v1/catalog/{category}/search?q=
pub async fn search(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let data = match state.session.search().search(category, &params.q).await? {
        SearchOutcome::Results(items) => SearchResults {
            items: annotate_items(state.session.cache(), category, items),
            superseded: false,
        },
        SearchOutcome::Superseded => SearchResults {
            items: Vec::new(),
            superseded: true,
        },
    };
    Ok(envelope(data))
}

/// GET /api/v1/catalog/{category}/trending
pub async fn trending(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let items = state.session.catalog().trending(category).await?;
    Ok(envelope(annotate_items(state.session.cache(), category, items)))
}
