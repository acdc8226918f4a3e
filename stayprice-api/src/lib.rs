//! stayprice-api library - HTTP surface for listing price estimates
//!
//! Stateless apart from the immutable estimator built at startup.

use axum::Router;
use std::sync::Arc;
use stayprice_common::Estimator;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Estimation pipeline (read-only after startup)
    pub estimator: Arc<Estimator>,
}

impl AppState {
    /// Create new application state
    pub fn new(estimator: Estimator) -> Self {
        Self {
            estimator: Arc::new(estimator),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api_routes = Router::new()
        .route("/api/schema", get(api::get_schema))
        .route("/api/estimate", post(api::create_estimate));

    Router::new()
        .merge(api_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
