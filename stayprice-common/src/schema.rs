//! Canonical model fields and attribute sets
//!
//! The model is invoked with a flat numeric vector whose positions map 1:1 to
//! [`FEATURE_ORDER`]. The model artifact carries no shape or name checking, so
//! reordering this list without retraining silently breaks every prediction.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::defaults::DefaultTable;
use crate::sweep::SweepSpec;
use crate::{Error, Result};

/// Number of canonical model inputs
pub const FIELD_COUNT: usize = 14;

/// Canonical model input fields
///
/// Declaration order equals model invocation order; `Ord` and [`Field::index`]
/// both rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "n_bathrooms")]
    Bathrooms,
    #[serde(rename = "n_guest")]
    Guests,
    #[serde(rename = "n_bedrooms")]
    Bedrooms,
    #[serde(rename = "n_beds")]
    Beds,
    #[serde(rename = "is_near_all_sights")]
    NearAllSights,
    #[serde(rename = "amenity_luxury_items")]
    LuxuryAmenity,
    #[serde(rename = "room_density")]
    RoomDensity,
    #[serde(rename = "location_rating")]
    LocationRating,
    #[serde(rename = "amenity_tv")]
    TvAmenity,
    #[serde(rename = "amenity_coffee")]
    CoffeeAmenity,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "distance_city_center")]
    DistanceCityCenter,
    #[serde(rename = "distance_to_acropolis")]
    DistanceAcropolis,
    #[serde(rename = "distance_to_stadium")]
    DistanceStadium,
}

/// Model invocation order
pub const FEATURE_ORDER: [Field; FIELD_COUNT] = [
    Field::Bathrooms,
    Field::Guests,
    Field::Bedrooms,
    Field::Beds,
    Field::NearAllSights,
    Field::LuxuryAmenity,
    Field::RoomDensity,
    Field::LocationRating,
    Field::TvAmenity,
    Field::CoffeeAmenity,
    Field::Rating,
    Field::DistanceCityCenter,
    Field::DistanceAcropolis,
    Field::DistanceStadium,
];

impl Field {
    /// Position of this field in the model input vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name, also used as the feature name in model artifacts
    pub fn name(self) -> &'static str {
        match self {
            Field::Bathrooms => "n_bathrooms",
            Field::Guests => "n_guest",
            Field::Bedrooms => "n_bedrooms",
            Field::Beds => "n_beds",
            Field::NearAllSights => "is_near_all_sights",
            Field::LuxuryAmenity => "amenity_luxury_items",
            Field::RoomDensity => "room_density",
            Field::LocationRating => "location_rating",
            Field::TvAmenity => "amenity_tv",
            Field::CoffeeAmenity => "amenity_coffee",
            Field::Rating => "rating",
            Field::DistanceCityCenter => "distance_city_center",
            Field::DistanceAcropolis => "distance_to_acropolis",
            Field::DistanceStadium => "distance_to_stadium",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        FEATURE_ORDER.iter().copied().find(|field| field.name() == name)
    }

    /// Fields computed from other inputs by the derived feature calculator
    pub fn is_derived(self) -> bool {
        matches!(self, Field::RoomDensity | Field::NearAllSights)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Partially known listing attributes, keyed by canonical field
///
/// Absent entries are unknown. Iteration is always in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttributeSet {
    values: [Option<f64>; FIELD_COUNT],
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project an arbitrary name → value mapping onto the canonical fields
    ///
    /// Unrecognised names are dropped. No domain validation happens here.
    pub fn filter<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, value) in entries {
            if let Some(field) = Field::from_name(name.as_ref()) {
                set.set(field, value);
            }
        }
        set
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: f64) {
        self.values[field.index()] = Some(value);
    }

    pub fn clear(&mut self, field: Field) {
        self.values[field.index()] = None;
    }

    /// Builder-style setter
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_present(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Canonical fields with no value, in canonical order
    pub fn missing(&self) -> Vec<Field> {
        FEATURE_ORDER
            .iter()
            .copied()
            .filter(|field| !self.is_present(*field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<f64>)> + '_ {
        FEATURE_ORDER.iter().map(move |field| (*field, self.get(*field)))
    }

    /// Present values keyed by wire name
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter()
            .filter_map(|(field, value)| value.map(|v| (field.name().to_string(), v)))
            .collect()
    }
}

/// A complete attribute set, ready for the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FIELD_COUNT],
}

impl FeatureVector {
    /// Returns `None` unless every canonical field is present
    pub fn from_attributes(attributes: &AttributeSet) -> Option<Self> {
        let mut values = [0.0; FIELD_COUNT];
        for (field, value) in attributes.iter() {
            values[field.index()] = value?;
        }
        Some(Self { values })
    }

    pub fn get(&self, field: Field) -> f64 {
        self.values[field.index()]
    }

    /// Copy of this vector with one field replaced
    pub fn with(&self, field: Field, value: f64) -> Self {
        let mut next = *self;
        next.values[field.index()] = value;
        next
    }

    /// Values in model invocation order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_attributes(&self) -> AttributeSet {
        AttributeSet {
            values: self.values.map(Some),
        }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for field in FEATURE_ORDER {
            map.serialize_entry(field.name(), &self.get(field))?;
        }
        map.end()
    }
}

/// First candidate whose breakdown key has already been seen
///
/// Keys are the printed form, so `3` and `3.0` collide.
fn first_repeated(candidates: &[f64]) -> Option<f64> {
    let mut seen = BTreeSet::new();
    candidates
        .iter()
        .copied()
        .find(|candidate| !seen.insert(candidate.to_string()))
}

/// Default table and sweep candidates, checked against the canonical field list
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    defaults: DefaultTable,
    sweeps: SweepSpec,
}

impl Schema {
    /// Validate that both tables cover exactly the canonical fields
    pub fn new(defaults: DefaultTable, sweeps: SweepSpec) -> Result<Self> {
        for field in FEATURE_ORDER {
            match defaults.get(field) {
                None => {
                    return Err(Error::Config(format!("no default value for field '{}'", field)))
                }
                Some(value) if !value.is_finite() => {
                    return Err(Error::Config(format!(
                        "default for '{}' is not a finite number",
                        field
                    )))
                }
                Some(_) => {}
            }

            match sweeps.get(field) {
                None => {
                    return Err(Error::Config(format!("no sweep candidates for field '{}'", field)))
                }
                Some([]) => {
                    return Err(Error::Config(format!("sweep candidates for '{}' are empty", field)))
                }
                Some(candidates) if candidates.iter().any(|c| !c.is_finite()) => {
                    return Err(Error::Config(format!(
                        "sweep candidates for '{}' contain a non-finite value",
                        field
                    )))
                }
                Some(candidates) => {
                    if let Some(repeated) = first_repeated(candidates) {
                        return Err(Error::Config(format!(
                            "sweep candidates for '{}' repeat the value {}",
                            field, repeated
                        )));
                    }
                }
            }
        }

        if defaults.len() != FIELD_COUNT || sweeps.len() != FIELD_COUNT {
            return Err(Error::Config(format!(
                "field tables diverge from the canonical list: {} defaults, {} sweeps, {} fields",
                defaults.len(),
                sweeps.len(),
                FIELD_COUNT
            )));
        }

        Ok(Self { defaults, sweeps })
    }

    /// Built-in tables shipped with the current model
    pub fn builtin() -> Self {
        Self {
            defaults: DefaultTable::builtin(),
            sweeps: SweepSpec::builtin(),
        }
    }

    /// Apply name-keyed overrides (from TOML) and re-validate
    pub fn with_overrides(
        self,
        defaults: &BTreeMap<String, f64>,
        sweeps: &BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let mut default_table = self.defaults;
        for (name, value) in defaults {
            let field = Field::from_name(name)
                .ok_or_else(|| Error::Config(format!("unknown field '{}' in [defaults]", name)))?;
            default_table.set(field, *value);
        }

        let mut sweep_spec = self.sweeps;
        for (name, candidates) in sweeps {
            let field = Field::from_name(name)
                .ok_or_else(|| Error::Config(format!("unknown field '{}' in [sweep]", name)))?;
            sweep_spec.set(field, candidates.clone());
        }

        Self::new(default_table, sweep_spec)
    }

    pub fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    pub fn sweeps(&self) -> &SweepSpec {
        &self.sweeps
    }

    /// Fill every absent field from the default table
    pub fn resolve(&self, attributes: &AttributeSet) -> Result<FeatureVector> {
        self.defaults.resolve(attributes)
    }
}
