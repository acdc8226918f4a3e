//! Model input schema endpoint
//!
//! Lets clients render input forms and sensitivity charts without
//! hard-coding the field list.

use axum::{extract::State, Json};
use serde::Serialize;
use stayprice_common::geo::{PointOfInterest, POINTS_OF_INTEREST};
use stayprice_common::validation::FieldDomain;
use stayprice_common::{Field, FEATURE_ORDER};

use crate::AppState;

/// One canonical field as seen by clients
#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub name: Field,
    /// Position in the model input vector
    pub position: usize,
    pub derived: bool,
    pub default: Option<f64>,
    pub candidates: Vec<f64>,
    pub domain: FieldDomain,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub model: String,
    pub fields: Vec<FieldInfo>,
    pub points_of_interest: Vec<PointOfInterest>,
}

/// GET /api/schema
pub async fn get_schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    let schema = state.estimator.schema();

    let fields = FEATURE_ORDER
        .iter()
        .map(|&field| FieldInfo {
            name: field,
            position: field.index(),
            derived: field.is_derived(),
            default: schema.defaults().get(field),
            candidates: schema.sweeps().get(field).unwrap_or_default().to_vec(),
            domain: FieldDomain::for_field(field),
        })
        .collect();

    Json(SchemaResponse {
        model: state.estimator.model_description(),
        fields,
        points_of_interest: POINTS_OF_INTEREST.to_vec(),
    })
}
