pub mod catalog;
pub mod health;
pub mod library;
pub mod profile;
pub mod recommendations;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /session                                         bind / unbind (PUT)
///
/// /library/{category}                              list, add
/// /library/{category}/{id}                         get, remove
/// /library/{category}/{id}/watched                 mark (PUT), unmark (DELETE)
/// /library/{category}/{id}/rating                  update rating (PUT)
///
/// /profile                                         taste profile
/// /profile/notes                                   save taste notes (PUT)
///
/// /catalog/{category}/search?q=                    latest-only search
/// /catalog/{category}/trending                     trending this week
///
/// /recommendations                                 run pipeline (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/session", session::router())
        .nest("/library", library::router())
        .nest("/profile", profile::router())
        .nest("/catalog", catalog::router())
        .nest("/recommendations", recommendations::router())
}
