use axum::routing::post;
use axum::Router;

use crate::handlers::recommendations;
use crate::state::AppState;

/// Recommendation routes mounted at `/recommendations`.
///
/// ```text
/// POST   /                  -> recommend
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(recommendations::recommend))
}
