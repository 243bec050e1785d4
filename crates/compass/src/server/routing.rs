//! Axum router configuration for all endpoints

use axum::{
  routing::{get, post},
  Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::server::handlers::{compass, status};
use crate::service::Compass;

/// Service instance shared by every handler
pub type SharedCompass = Arc<Mutex<Compass>>;

/// Create the main application router
pub fn create_router(state: SharedCompass) -> Router {
  Router::new()
    // Status endpoint
    .route("/status", get(status::status))
    // Corpus and backend session
    .route("/upload", post(compass::upload))
    .route("/backend/load", post(compass::load_backend))
    .route("/backend/unload", post(compass::unload_backend))
    // Rating
    .route("/coordinates", post(compass::coordinates))
    .route("/define", post(compass::define))
    .route("/context", post(compass::context))
    .route("/reset", post(compass::reset))
    .with_state(state)
}
