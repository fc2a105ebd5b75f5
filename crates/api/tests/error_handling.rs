//! Status-code mapping of [`AppError`].

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use marquee_api::error::AppError;
use marquee_catalog::CatalogError;
use marquee_core::category::Category;
use marquee_core::error::CoreError;
use marquee_core::response::ResponseError;
use marquee_library::CacheError;
use marquee_recommend::PipelineError;
use marquee_store::StoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn invalid_rating_is_400() {
    let (status, json) =
        error_to_response(AppError::Cache(CacheError::InvalidRating(CoreError::InvalidRating(7))))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_entity_is_404() {
    let (status, _) = error_to_response(AppError::Cache(CacheError::Missing {
        category: Category::Tv,
        id: 3,
    }))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remote_outage_is_503_without_details() {
    let (status, json) = error_to_response(AppError::Cache(CacheError::RemoteUnavailable(
        StoreError::Unavailable("socket closed at 10.0.0.7".into()),
    )))
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!json["error"].as_str().unwrap().contains("10.0.0.7"));
}

#[tokio::test]
async fn upstream_failures_are_502() {
    let (status, json) = error_to_response(AppError::Catalog(CatalogError::Api {
        status: 401,
        body: "bad token".into(),
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "CATALOG_ERROR");

    let (status, _) = error_to_response(AppError::Pipeline(PipelineError::Response(
        ResponseError::UnrecognizedResponseType("poem".into()),
    )))
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[test]
fn core_errors_convert() {
    let err: AppError = CoreError::UnknownCategory("podcast".into()).into();
    assert_matches!(err, AppError::Core(CoreError::UnknownCategory(_)));
}
