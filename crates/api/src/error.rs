use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_catalog::CatalogError;
use marquee_core::error::CoreError;
use marquee_library::CacheError;
use marquee_recommend::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of each crate and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `marquee_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A library mutation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The catalog could not be queried.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A recommendation request failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// No identity is bound to the session.
    #[error("Signed out")]
    SignedOut,

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::UnknownCategory(_) => {
                    (StatusCode::BAD_REQUEST, "UNKNOWN_CATEGORY", core.to_string())
                }
                CoreError::InvalidRating(_) | CoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
                }
            },

            // --- Library mutations ---
            AppError::Cache(err) => match err {
                CacheError::InvalidRating(core) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
                }
                CacheError::Missing { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                CacheError::RemoteUnavailable(e) => {
                    tracing::error!(error = %e, "Remote store unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "REMOTE_UNAVAILABLE",
                        "The library store is unavailable".to_string(),
                    )
                }
            },

            // --- Upstream services ---
            AppError::Catalog(err) => {
                tracing::error!(error = %err, "Catalog error");
                (
                    StatusCode::BAD_GATEWAY,
                    "CATALOG_ERROR",
                    "The catalog could not be queried".to_string(),
                )
            }
            AppError::Pipeline(err) => {
                tracing::error!(error = %err, "Recommendation pipeline error");
                (
                    StatusCode::BAD_GATEWAY,
                    "RECOMMENDATION_FAILED",
                    "Could not produce recommendations".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::SignedOut => (
                StatusCode::UNAUTHORIZED,
                "SIGNED_OUT",
                "No user is signed in".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
