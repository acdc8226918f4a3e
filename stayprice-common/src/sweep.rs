//! Sensitivity sweep engine
//!
//! For every field the caller left unspecified, hold the baseline fixed and
//! re-run the model once per candidate value of that field. Fields are swept
//! independently against the same baseline, never combinatorially, so the
//! number of model calls is the sum of the candidate list lengths. The
//! resulting ranges therefore do not reflect interactions between fields.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::{FeatureVector, Field, FEATURE_ORDER};
use crate::{Error, Result};

const COUNT_CANDIDATES: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
const FLAG_CANDIDATES: [f64; 2] = [0.0, 1.0];
const RATING_CANDIDATES: [f64; 4] = [2.0, 3.0, 4.0, 5.0];
const DISTANCE_CANDIDATES: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

fn builtin_candidates(field: Field) -> Vec<f64> {
    match field {
        Field::Bathrooms | Field::Guests | Field::Bedrooms | Field::Beds | Field::RoomDensity => {
            COUNT_CANDIDATES.to_vec()
        }
        Field::NearAllSights
        | Field::LuxuryAmenity
        | Field::TvAmenity
        | Field::CoffeeAmenity => FLAG_CANDIDATES.to_vec(),
        Field::LocationRating | Field::Rating => RATING_CANDIDATES.to_vec(),
        Field::DistanceCityCenter | Field::DistanceAcropolis | Field::DistanceStadium => {
            DISTANCE_CANDIDATES.to_vec()
        }
    }
}

/// Ordered candidate values per canonical field
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSpec {
    candidates: BTreeMap<Field, Vec<f64>>,
}

impl SweepSpec {
    pub fn builtin() -> Self {
        Self {
            candidates: FEATURE_ORDER
                .iter()
                .map(|field| (*field, builtin_candidates(*field)))
                .collect(),
        }
    }

    pub fn get(&self, field: Field) -> Option<&[f64]> {
        self.candidates.get(&field).map(Vec::as_slice)
    }

    pub fn set(&mut self, field: Field, candidates: Vec<f64>) {
        self.candidates.insert(field, candidates);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Exact number of model calls a sweep over `missing` will make
    pub fn planned_invocations(&self, missing: &[Field]) -> usize {
        missing
            .iter()
            .map(|field| self.get(*field).map_or(0, <[f64]>::len))
            .sum()
    }
}

/// One substituted candidate and the resulting nightly price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub candidate: f64,
    pub price: f64,
}

/// All sweep points for one field, in candidate order
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSweep {
    pub field: Field,
    pub points: Vec<SweepPoint>,
}

/// Sweep each missing field independently around `baseline`
///
/// `predict` receives a complete vector in canonical order and returns a
/// price. The first prediction error aborts the sweep.
pub fn sweep<F>(
    missing: &[Field],
    baseline: &FeatureVector,
    spec: &SweepSpec,
    mut predict: F,
) -> Result<Vec<FieldSweep>>
where
    F: FnMut(&FeatureVector) -> Result<f64>,
{
    let mut sweeps = Vec::with_capacity(missing.len());

    for &field in missing {
        let candidates = spec
            .get(field)
            .ok_or_else(|| Error::Config(format!("no sweep candidates for field '{}'", field)))?;

        let mut points = Vec::with_capacity(candidates.len());
        for &candidate in candidates {
            let input = baseline.with(field, candidate);
            let price = predict(&input)?;
            points.push(SweepPoint { candidate, price });
        }

        sweeps.push(FieldSweep { field, points });
    }

    Ok(sweeps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DefaultTable;
    use crate::schema::AttributeSet;

    fn baseline() -> FeatureVector {
        DefaultTable::builtin().resolve(&AttributeSet::new()).unwrap()
    }

    #[test]
    fn test_builtin_candidates() {
        let spec = SweepSpec::builtin();
        assert_eq!(spec.len(), FEATURE_ORDER.len());
        assert_eq!(spec.get(Field::Rating), Some(&[2.0, 3.0, 4.0, 5.0][..]));
        assert_eq!(spec.get(Field::TvAmenity), Some(&[0.0, 1.0][..]));
        assert_eq!(spec.get(Field::DistanceAcropolis), Some(&[0.5, 1.0, 1.5, 2.0][..]));
        for field in FEATURE_ORDER {
            let n = spec.get(field).unwrap().len();
            assert!((2..=4).contains(&n), "{} has {} candidates", field, n);
        }
    }

    #[test]
    fn test_planned_invocations() {
        let spec = SweepSpec::builtin();
        assert_eq!(spec.planned_invocations(&[]), 0);
        assert_eq!(spec.planned_invocations(&[Field::Rating]), 4);
        assert_eq!(
            spec.planned_invocations(&[Field::Rating, Field::TvAmenity, Field::Beds]),
            10
        );
    }

    #[test]
    fn test_sweep_holds_other_fields_at_baseline() {
        let base = baseline();
        let mut seen = Vec::new();
        let sweeps = sweep(&[Field::Rating], &base, &SweepSpec::builtin(), |input| {
            seen.push(*input);
            Ok(input.get(Field::Rating) * 10.0)
        })
        .unwrap();

        assert_eq!(seen.len(), 4);
        for input in &seen {
            for field in FEATURE_ORDER.iter().filter(|f| **f != Field::Rating) {
                assert_eq!(input.get(*field), base.get(*field));
            }
        }

        assert_eq!(sweeps.len(), 1);
        let prices: Vec<f64> = sweeps[0].points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_sweeps_are_independent() {
        let base = baseline();
        let mut calls = 0;
        let sweeps = sweep(
            &[Field::Bathrooms, Field::CoffeeAmenity],
            &base,
            &SweepSpec::builtin(),
            |input| {
                calls += 1;
                if input.get(Field::CoffeeAmenity) != base.get(Field::CoffeeAmenity) {
                    assert_eq!(input.get(Field::Bathrooms), base.get(Field::Bathrooms));
                }
                Ok(1.0)
            },
        )
        .unwrap();

        assert_eq!(calls, 6);
        assert_eq!(sweeps[0].field, Field::Bathrooms);
        assert_eq!(sweeps[1].field, Field::CoffeeAmenity);
        assert_eq!(sweeps[1].points.len(), 2);
    }

    #[test]
    fn test_sweep_stops_on_error() {
        let mut calls = 0;
        let result = sweep(&[Field::Beds], &baseline(), &SweepSpec::builtin(), |input| {
            calls += 1;
            Err(Error::prediction(input, "boom"))
        });
        assert!(matches!(result, Err(Error::Prediction { .. })));
        assert_eq!(calls, 1);
    }
}
