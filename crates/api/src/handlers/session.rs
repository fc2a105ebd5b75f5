//! Handlers for binding the session to a user.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use marquee_core::error::CoreError;
use marquee_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindSessionRequest {
    /// `null` signs out.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: Option<UserId>,
    pub signed_in: bool,
}

/// PUT /api/v1/session
///
/// Bind the session to `userId`, or sign out when it is `null`. Binding
/// schedules the once-per-session backfill pass.
pub async fn bind_session(
    State(state): State<AppState>,
    Json(input): Json<BindSessionRequest>,
) -> AppResult<impl IntoResponse> {
    match input.user_id.as_deref().map(str::trim) {
        Some("") => {
            return Err(CoreError::Validation("userId must not be blank".into()).into());
        }
        Some(id) => state.session.sign_in(UserId::new(id)).await?,
        None => state.session.sign_out().await?,
    }

    let user_id = state.session.cache().user();
    tracing::info!(user_id = ?user_id, "Session rebound");

    Ok(envelope(SessionInfo {
        signed_in: user_id.is_some(),
        user_id,
    }))
}
