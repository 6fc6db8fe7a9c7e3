//! Identity endpoint

use axum::Json;
use serde::Serialize;

/// Service identity returned by `GET /`
pub const SERVICE_NAME: &str = "PA Recommender Engine";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    #[serde(rename = "Result")]
    pub result: &'static str,
}

/// GET /
///
/// Answers regardless of artifact contents once the server is listening.
pub async fn read_root() -> Json<RootResponse> {
    Json(RootResponse {
        result: SERVICE_NAME,
    })
}
