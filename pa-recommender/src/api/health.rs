//! Health check endpoint
//!
//! Reports the build and the sizes of the loaded artifacts.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::artifacts::ArtifactStore;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub artifacts: ArtifactSummary,
}

/// Sizes of the loaded artifacts
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub artists: usize,
    pub venues: usize,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
    pub model_users: usize,
    pub model_items: usize,
}

impl From<&ArtifactStore> for ArtifactSummary {
    fn from(store: &ArtifactStore) -> Self {
        Self {
            artists: store.artists.len(),
            venues: store.venues.len(),
            matrix_rows: store.matrix.rows(),
            matrix_cols: store.matrix.cols(),
            model_users: store.model.user_count(),
            model_items: store.model.item_count(),
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        artifacts: state.recommender.store().into(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
