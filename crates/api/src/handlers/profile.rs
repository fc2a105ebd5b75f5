use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveNotesRequest {
    pub notes: String,
}

/// GET /api/v1/profile
///
/// Taste profile built fresh from the cache on every call.
pub async fn get_profile(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(envelope(state.session.profile()))
}

/// PUT /api/v1/profile/notes
pub async fn save_notes(
    State(state): State<AppState>,
    Json(input): Json<SaveNotesRequest>,
) -> AppResult<impl IntoResponse> {
    if state.session.cache().save_taste_notes(&input.notes).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SignedOut)
    }
}
