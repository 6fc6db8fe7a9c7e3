//! pa-recommender library - PA Recommender Engine
//!
//! Serves a pre-trained collaborative-filtering model over HTTP: venues for
//! an artist, artists for a venue, and a fixed default list for unknown
//! identifiers.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod artifacts;
pub mod error;
pub mod matrix;
pub mod model;
pub mod resolver;
pub mod service;

pub use crate::artifacts::ArtifactStore;
pub use crate::error::{ApiError, ApiResult};
pub use crate::service::RecommendationService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Recommendation service over the loaded artifacts
    pub recommender: Arc<RecommendationService>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            recommender: Arc::new(RecommendationService::new(Arc::new(store))),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::read_root))
        .route("/recommend-venues/:paid", get(api::recommend_venues))
        .route("/recommend-artists/:paid", get(api::recommend_artists))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
