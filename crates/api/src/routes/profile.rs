use axum::routing::{get, put};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Profile routes mounted at `/profile`.
///
/// ```text
/// GET    /                  -> get_profile
/// PUT    /notes             -> save_notes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::get_profile))
        .route("/notes", put(profile::save_notes))
}
