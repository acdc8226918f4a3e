//! API error type and HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Estimation pipeline error
    #[error(transparent)]
    Estimate(#[from] stayprice_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use stayprice_common::Error as E;

        let (status, error_code, message, input): (StatusCode, &str, String, Option<Value>) =
            match self {
                ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
                ApiError::Estimate(err) => match err {
                    E::Validation { .. } => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string(), None)
                    }
                    E::PredictionBudget { .. } => (
                        StatusCode::BAD_REQUEST,
                        "PREDICTION_BUDGET_EXCEEDED",
                        err.to_string(),
                        None,
                    ),
                    E::Prediction { .. } => {
                        let input = err.input().and_then(|v| serde_json::to_value(v).ok());
                        error!("{} (input: {:?})", err, input);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "PREDICTION_ERROR",
                            err.to_string(),
                            input,
                        )
                    }
                    E::Config(_) | E::Io(_) => {
                        error!("{}", err);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_ERROR",
                            err.to_string(),
                            None,
                        )
                    }
                },
            };

        if status.is_client_error() {
            warn!("Rejected request: {}", message);
        }

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(input) = input {
            error["input"] = input;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
