//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness plus the model the service is answering with
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Name and version of the loaded price model
    pub model: String,
    /// Model calls allowed per request; absent when unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_budget: Option<usize>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: "stayprice",
        version: env!("CARGO_PKG_VERSION"),
        model: state.estimator.model_description(),
        prediction_budget: state.estimator.prediction_budget(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
