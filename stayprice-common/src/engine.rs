//! Estimate orchestration
//!
//! Request → validated attributes → location/amenity expansion → derived
//! features → defaults → either one prediction (nothing missing) or a
//! sensitivity sweep over every missing field.

use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregate::{Estimate, EstimateReport, PointEstimate, RangeEstimate};
use crate::amenities::amenity_flags;
use crate::derived;
use crate::geo::distances_from;
use crate::model::{to_price, PriceModel};
use crate::request::EstimateRequest;
use crate::schema::{AttributeSet, FeatureVector, Schema};
use crate::sweep::sweep;
use crate::validation::validate_attributes;
use crate::{Error, Result};

/// Default cap on model calls per request
pub const DEFAULT_MAX_PREDICTIONS: usize = 64;

/// Immutable estimation pipeline, shared across requests
pub struct Estimator {
    schema: Schema,
    model: Arc<dyn PriceModel>,
    max_predictions: Option<usize>,
}

impl Estimator {
    pub fn new(schema: Schema, model: Arc<dyn PriceModel>) -> Self {
        Self {
            schema,
            model,
            max_predictions: Some(DEFAULT_MAX_PREDICTIONS),
        }
    }

    /// Cap the number of model calls a single request may plan; `None` disables the cap
    pub fn with_prediction_budget(mut self, limit: Option<usize>) -> Self {
        self.max_predictions = limit;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn prediction_budget(&self) -> Option<usize> {
        self.max_predictions
    }

    pub fn model_description(&self) -> String {
        self.model.describe()
    }

    /// Build the attribute set for a request, before defaulting
    pub fn collect_attributes(&self, request: &EstimateRequest) -> Result<AttributeSet> {
        let mut attributes = validate_attributes(&request.attributes)?;

        if let Some(location) = &request.location {
            location.validate()?;
            for (field, distance) in distances_from(location) {
                if !attributes.is_present(field) {
                    attributes.set(field, distance);
                }
            }
        }

        if let Some(flags) = amenity_flags(&request.amenities) {
            for (field, flag) in flags {
                attributes.set(field, flag);
            }
        }

        Ok(derived::apply(&attributes))
    }

    /// Produce a point estimate or a sensitivity range for `request`
    pub fn estimate(&self, request: &EstimateRequest) -> Result<EstimateReport> {
        let attributes = self.collect_attributes(request)?;
        let missing = attributes.missing();
        let nights = request.nights();
        let baseline = self.schema.resolve(&attributes)?;

        let estimate = if missing.is_empty() {
            let price = self.predict_price(&baseline)?;
            Estimate::Point(PointEstimate::new(price, nights))
        } else {
            let planned = self.schema.sweeps().planned_invocations(&missing);
            if let Some(limit) = self.max_predictions {
                if planned > limit {
                    return Err(Error::PredictionBudget { planned, limit });
                }
            }

            debug!(
                "Sweeping {} missing fields ({} model calls): {:?}",
                missing.len(),
                planned,
                missing
            );

            let sweeps = sweep(&missing, &baseline, self.schema.sweeps(), |input| {
                self.predict_price(input)
            })?;
            Estimate::Range(RangeEstimate::from_sweeps(sweeps, nights)?)
        };

        if let Some(total) = estimate.total_range() {
            if !total.max.is_finite() {
                return Err(Error::prediction(
                    &priciest_input(&estimate, &baseline),
                    format!(
                        "stay total over {} nights overflows at {:.3e} per night",
                        nights.unwrap_or_default(),
                        estimate.nightly_range().max
                    ),
                ));
            }
        }

        let range = estimate.nightly_range();
        info!(
            "Estimated {:.2}..{:.2} per night ({} fields defaulted, nights: {:?})",
            range.min,
            range.max,
            missing.len(),
            nights
        );

        Ok(EstimateReport::new(estimate, nights, missing, request.audience))
    }

    /// One model call, converted from log space to a price
    pub fn predict_price(&self, input: &FeatureVector) -> Result<f64> {
        let raw = self
            .model
            .predict(input.as_slice())
            .map_err(|e| Error::prediction(input, e.to_string()))?;

        if !raw.is_finite() {
            return Err(Error::prediction(
                input,
                format!("model returned non-finite value {}", raw),
            ));
        }

        let price = to_price(raw);
        if !price.is_finite() {
            return Err(Error::prediction(
                input,
                format!("raw prediction {} overflows the price transform", raw),
            ));
        }

        Ok(price)
    }
}

/// Model input behind the highest nightly price of an estimate
fn priciest_input(estimate: &Estimate, baseline: &FeatureVector) -> FeatureVector {
    match estimate {
        Estimate::Point(_) => *baseline,
        Estimate::Range(range) => range
            .per_field_breakdown
            .0
            .iter()
            .flat_map(|sweep| sweep.points.iter().map(move |point| (sweep.field, point)))
            .max_by(|a, b| a.1.price.total_cmp(&b.1.price))
            .map(|(field, point)| baseline.with(field, point.candidate))
            .unwrap_or(*baseline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FnModel, ModelError};
    use crate::schema::{Field, FEATURE_ORDER};

    fn constant(raw: f64) -> Arc<dyn PriceModel> {
        Arc::new(FnModel(
            move |_: &[f64]| -> std::result::Result<f64, ModelError> { Ok(raw) },
        ))
    }

    #[test]
    fn test_predict_price_transforms_log_output() {
        let estimator = Estimator::new(Schema::builtin(), constant(100f64.ln_1p()));
        let input = Schema::builtin().resolve(&AttributeSet::new()).unwrap();
        let price = estimator.predict_price(&input).unwrap();
        assert!((price - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_price_rejects_non_finite() {
        let estimator = Estimator::new(Schema::builtin(), constant(f64::NAN));
        let input = Schema::builtin().resolve(&AttributeSet::new()).unwrap();
        match estimator.predict_price(&input).unwrap_err() {
            Error::Prediction { input: attached, reason } => {
                assert_eq!(*attached, input);
                assert!(reason.contains("non-finite"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_predict_price_rejects_overflow() {
        let estimator = Estimator::new(Schema::builtin(), constant(1000.0));
        let input = Schema::builtin().resolve(&AttributeSet::new()).unwrap();
        assert!(matches!(
            estimator.predict_price(&input),
            Err(Error::Prediction { .. })
        ));
    }

    #[test]
    fn test_model_error_carries_input() {
        let failing: Arc<dyn PriceModel> = Arc::new(FnModel(
            |_: &[f64]| -> std::result::Result<f64, ModelError> {
                Err(ModelError::Evaluation("broken".to_string()))
            },
        ));
        let estimator = Estimator::new(Schema::builtin(), failing);
        let err = estimator.estimate(&EstimateRequest::new()).unwrap_err();
        assert!(matches!(err, Error::Prediction { ref reason, .. } if reason == "broken"));
        assert!(err.input().is_some());
    }

    #[test]
    fn test_location_fills_distances() {
        let estimator = Estimator::new(Schema::builtin(), constant(4.0));
        let mut request = EstimateRequest::new().with_attribute("distance_to_stadium", 9.0);
        request.location = Some(crate::geo::GeoPoint::new(37.9715, 23.7257));

        let attributes = estimator.collect_attributes(&request).unwrap();
        assert!(attributes.get(Field::DistanceAcropolis).unwrap() < 1e-6);
        assert_eq!(attributes.get(Field::DistanceStadium), Some(9.0));
        assert_eq!(attributes.get(Field::NearAllSights), Some(0.0));
    }

    #[test]
    fn test_amenities_override_flags() {
        let estimator = Estimator::new(Schema::builtin(), constant(4.0));
        let mut request = EstimateRequest::new().with_attribute("amenity_tv", 0.0);
        request.amenities = vec![crate::amenities::Amenity::Tv];

        let attributes = estimator.collect_attributes(&request).unwrap();
        assert_eq!(attributes.get(Field::TvAmenity), Some(1.0));
        assert_eq!(attributes.get(Field::CoffeeAmenity), Some(0.0));
    }

    #[test]
    fn test_budget_rejects_before_calling_model() {
        let estimator =
            Estimator::new(Schema::builtin(), constant(4.0)).with_prediction_budget(Some(3));
        let err = estimator.estimate(&EstimateRequest::new()).unwrap_err();
        assert!(matches!(err, Error::PredictionBudget { limit: 3, .. }));
    }

    #[test]
    fn test_point_total_overflow_is_prediction_error() {
        let estimator = Estimator::new(Schema::builtin(), constant(709.0));
        let in_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let out_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 11).unwrap();
        let request = EstimateRequest::new().with_stay(in_date, out_date);
        let complete = Schema::builtin().resolve(&AttributeSet::new()).unwrap();
        let request = FEATURE_ORDER
            .iter()
            .filter(|field| !field.is_derived())
            .fold(request, |request, field| {
                request.with_attribute(field.name(), complete.get(*field))
            });

        match estimator.estimate(&request).unwrap_err() {
            Error::Prediction { input, reason } => {
                assert_eq!(input.get(Field::Guests), complete.get(Field::Guests));
                assert!(reason.contains("10 nights"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_range_total_overflow_is_prediction_error() {
        let estimator = Estimator::new(Schema::builtin(), constant(709.0));
        let in_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let out_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 11).unwrap();
        let request = EstimateRequest::new().with_stay(in_date, out_date);

        let err = estimator.estimate(&request).unwrap_err();
        assert!(matches!(
            err,
            Error::Prediction { ref reason, .. } if reason.contains("overflows")
        ));
    }

    #[test]
    fn test_large_finite_total_is_kept() {
        let estimator = Estimator::new(Schema::builtin(), constant(700.0));
        let in_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let out_date = chrono::NaiveDate::from_ymd_opt(2025, 8, 3).unwrap();
        let request = EstimateRequest::new().with_stay(in_date, out_date);

        let report = estimator.estimate(&request).unwrap();
        assert!(report.estimate.total_range().unwrap().max.is_finite());
    }
}
