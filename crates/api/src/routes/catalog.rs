use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes mounted at `/catalog`.
///
/// ```text
/// GET    /{category}/search?q=      -> search
/// GET    /{category}/trending       -> trending
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{category}/search", get(catalog::search))
        .route("/{category}/trending", get(catalog::trending))
}
