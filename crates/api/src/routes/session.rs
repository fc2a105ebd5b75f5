use axum::routing::put;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Session routes mounted at `/session`.
///
/// ```text
/// PUT    /                  -> bind_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", put(session::bind_session))
}
