//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use leaf_disease::backend::backend_name;
use leaf_disease::inference::ClassifierStatus;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct ModelHealth {
    #[serde(flatten)]
    pub status: ClassifierStatus,
    pub path: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub version: String,
    pub backend: String,
    pub model: ModelHealth,
}

/// GET /health - Health check endpoint
///
/// Reports the classifier lifecycle without triggering a load.
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    let classifier = state.predictor.classifier();

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        started_at: state.started_at_utc.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend_name().to_string(),
        model: ModelHealth {
            status: classifier.status(),
            path: classifier.model_path().display().to_string(),
        },
    })
}
