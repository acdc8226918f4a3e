//! Default values and the default resolver
//!
//! Defaults are versioned with the model artifact. They are only used for
//! fields the caller left absent; an invalid value is never replaced.

use std::collections::BTreeMap;

use crate::derived::ROOM_DENSITY_BEDROOM_OFFSET;
use crate::schema::{AttributeSet, FeatureVector, Field, FEATURE_ORDER};
use crate::{Error, Result};

const DEFAULT_COUNT: f64 = 2.0;
const DEFAULT_RATING: f64 = 4.0;
const DEFAULT_DISTANCE_KM: f64 = 1.0;
const DEFAULT_FLAG: f64 = 1.0;

/// Room density implied by the default guest and bedroom counts
pub const DEFAULT_ROOM_DENSITY: f64 = DEFAULT_COUNT / (DEFAULT_COUNT + ROOM_DENSITY_BEDROOM_OFFSET);

fn builtin_default(field: Field) -> f64 {
    match field {
        Field::Bathrooms | Field::Guests | Field::Bedrooms | Field::Beds => DEFAULT_COUNT,
        Field::NearAllSights
        | Field::LuxuryAmenity
        | Field::TvAmenity
        | Field::CoffeeAmenity => DEFAULT_FLAG,
        Field::RoomDensity => DEFAULT_ROOM_DENSITY,
        Field::LocationRating | Field::Rating => DEFAULT_RATING,
        Field::DistanceCityCenter | Field::DistanceAcropolis | Field::DistanceStadium => {
            DEFAULT_DISTANCE_KM
        }
    }
}

/// Fallback value per canonical field
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTable {
    values: BTreeMap<Field, f64>,
}

impl DefaultTable {
    pub fn builtin() -> Self {
        Self {
            values: FEATURE_ORDER
                .iter()
                .map(|field| (*field, builtin_default(*field)))
                .collect(),
        }
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn set(&mut self, field: Field, value: f64) {
        self.values.insert(field, value);
    }

    pub fn remove(&mut self, field: Field) -> Option<f64> {
        self.values.remove(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Complete `attributes` from this table without touching the input
    ///
    /// Present values win; absent values take the default.
    pub fn resolve(&self, attributes: &AttributeSet) -> Result<FeatureVector> {
        let mut resolved = *attributes;
        for field in attributes.missing() {
            let value = self
                .get(field)
                .ok_or_else(|| Error::Config(format!("no default value for field '{}'", field)))?;
            resolved.set(field, value);
        }

        FeatureVector::from_attributes(&resolved)
            .ok_or_else(|| Error::Config("default resolution left fields unset".to_string()))
    }
}
