//! Route definitions for the user's library.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// Library routes mounted at `/library`.
///
/// ```text
/// GET    /{category}                 -> list_entities
/// POST   /{category}                 -> add_entity
/// GET    /{category}/{id}            -> get_entity
/// DELETE /{category}/{id}            -> remove_entity
/// PUT    /{category}/{id}/watched    -> mark_watched
/// DELETE /{category}/{id}/watched    -> unmark_watched
/// PUT    /{category}/{id}/rating     -> update_rating
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{category}",
            get(library::list_entities).post(library::add_entity),
        )
        .route(
            "/{category}/{id}",
            get(library::get_entity).delete(library::remove_entity),
        )
        .route(
            "/{category}/{id}/watched",
            put(library::mark_watched).delete(library::unmark_watched),
        )
        .route("/{category}/{id}/rating", put(library::update_rating))
}
