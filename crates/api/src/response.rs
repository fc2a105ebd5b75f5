//! Success bodies.
//!
//! Every successful response is `{ "data": ... }`. Failures use the
//! `{ "error", "code" }` shape from [`crate::error`].

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `200 OK` with `data` in the envelope.
pub fn envelope<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}

/// `201 Created` with `data` in the envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<DataResponse<T>>) {
    (StatusCode::CREATED, envelope(data))
}
