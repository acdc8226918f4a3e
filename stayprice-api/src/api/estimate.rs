//! Price estimate endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use stayprice_common::{EstimateReport, EstimateRequest};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/estimate
///
/// Returns `{price, total?}` when every model input is known, otherwise
/// `{price_range, per_field_breakdown, total_range?}` over the sensitivity
/// sweeps of the missing inputs. Both shapes carry a `summary` sentence.
pub async fn create_estimate(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> ApiResult<Json<EstimateReport>> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    debug!("Estimate request: {:?}", request);

    let report = state.estimator.estimate(&request)?;
    Ok(Json(report))
}
