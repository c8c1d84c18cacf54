//! Plant disease prediction server
//!
//! axum service exposing `POST /predict/disease` plus health and catalog
//! listing endpoints. The router is built from an [`AppState`] so tests can
//! inject their own model loader.

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use leaf_disease::api::PREDICT_PATH;

pub use error::ApiError;
pub use state::{AppState, SharedState};

/// Build the application router
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Prediction
        .route(PREDICT_PATH, post(routes::predict::predict_disease))
        // Catalog
        .route("/diseases", get(routes::diseases::list_diseases))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
