//! HTTP API handlers for pa-recommender

pub mod health;
pub mod recommend;
pub mod root;

pub use health::health_routes;
pub use recommend::{recommend_artists, recommend_venues};
pub use root::read_root;
