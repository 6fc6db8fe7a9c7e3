//! HTTP error mapping for pa-recommender
//!
//! Unknown identifiers are not errors; they get the fallback list. Only
//! failures while ranking a resolved identifier reach this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::service::RecommendError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Ranking failed for a resolved identifier (500)
    #[error("Recommendation failed: {0}")]
    Recommendation(#[from] RecommendError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match self {
            ApiError::Recommendation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RECOMMENDATION_FAILED")
            }
        };
        error!("{}", self);

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
