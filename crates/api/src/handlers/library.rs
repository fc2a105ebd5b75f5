//! Handlers for the user's library.
//!
//! Reads come straight from the entity cache. Writes go to the remote
//! store and return as soon as it accepts them; the cache reflects them
//! once the store echoes the change.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marquee_core::entity::CatalogItem;
use marquee_core::types::EntityId;
use marquee_library::AddOutcome;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::parse_category;
use crate::response::{created, envelope};
use crate::state::AppState;

/// Body for marking watched or changing a rating.
#[derive(Debug, Deserialize)]
pub struct UserStateRequest {
    /// 1-5 stars, or `null` for unrated.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: String,
}

/// Map a mutation's "written" flag to a response.
fn accepted(written: bool) -> AppResult<StatusCode> {
    if written {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SignedOut)
    }
}

/// GET /api/v1/library/{category}
pub async fn list_entities(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let entities = state.session.cache().all(category);
    Ok(envelope(entities))
}

/// POST /api/v1/library/{category}
///
/// Add a catalog item. Returns 201 when written, 409 when the id is
/// already in the library, 401 when signed out.
pub async fn add_entity(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(item): Json<CatalogItem>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    if item.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be blank".into()));
    }

    match state.session.cache().add(category, &item).await? {
        AddOutcome::Added => Ok(created(serde_json::json!({ "id": item.id, "category": category }))),
        AddOutcome::Duplicate => Err(AppError::Conflict(format!(
            "{} is already in your {}",
            item.title,
            category.plural_label()
        ))),
        AddOutcome::SignedOut => Err(AppError::SignedOut),
    }
}

/// GET /api/v1/library/{category}/{id}
pub async fn get_entity(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let entity = state
        .session
        .cache()
        .find(category, id)
        .ok_or_else(|| AppError::NotFound(format!("{category} {id} is not in the library")))?;
    Ok(envelope(entity))
}

/// DELETE /api/v1/library/{category}/{id}
pub async fn remove_entity(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    accepted(state.session.cache().remove(category, id).await?)
}

/// PUT /api/v1/library/{category}/{id}/watched
pub async fn mark_watched(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, EntityId)>,
    Json(input): Json<UserStateRequest>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let written = state
        .session
        .cache()
        .mark_watched(category, id, input.rating, &input.notes)
        .await?;
    accepted(written)
}

/// DELETE /api/v1/library/{category}/{id}/watched
pub async fn unmark_watched(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    accepted(state.session.cache().unmark_watched(category, id).await?)
}

/// PUT /api/v1/library/{category}/{id}/rating
pub async fn update_rating(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, EntityId)>,
    Json(input): Json<UserStateRequest>,
) -> AppResult<impl IntoResponse> {
    let category = parse_category(&category)?;
    let written = state
        .session
        .cache()
        .update_rating(category, id, input.rating, &input.notes)
        .await?;
    accepted(written)
}
