//! Input validation
//!
//! Every caller-supplied attribute is classified as absent, valid or
//! invalid. Absent fields are defaulted downstream; a single invalid field
//! rejects the whole request.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::schema::{AttributeSet, Field};
use crate::{Error, Result};

const MAX_ROOM_COUNT: f64 = 15.0;
const MAX_BATHROOMS: f64 = 5.0;
const MIN_RATING: f64 = 0.1;
const MAX_RATING: f64 = 5.0;

/// Valid value domain of a canonical field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDomain {
    /// Whole number within `min..=max`
    Count { min: f64, max: f64 },
    /// Any number within `min..=max`
    Range { min: f64, max: f64 },
    /// Any number `>= 0`
    NonNegative,
    /// Any number `> 0`
    Positive,
    /// Exactly 0 or 1
    Flag,
}

impl FieldDomain {
    pub fn for_field(field: Field) -> Self {
        match field {
            Field::Guests | Field::Bedrooms | Field::Beds => FieldDomain::Count {
                min: 1.0,
                max: MAX_ROOM_COUNT,
            },
            Field::Bathrooms => FieldDomain::Range {
                min: 1.0,
                max: MAX_BATHROOMS,
            },
            Field::LocationRating | Field::Rating => FieldDomain::Range {
                min: MIN_RATING,
                max: MAX_RATING,
            },
            Field::DistanceCityCenter | Field::DistanceAcropolis | Field::DistanceStadium => {
                FieldDomain::NonNegative
            }
            Field::RoomDensity => FieldDomain::Positive,
            Field::NearAllSights
            | Field::LuxuryAmenity
            | Field::TvAmenity
            | Field::CoffeeAmenity => FieldDomain::Flag,
        }
    }

    /// Explain why `value` is outside this domain, if it is
    pub fn check(&self, value: f64) -> std::result::Result<(), String> {
        if !value.is_finite() {
            return Err("must be a finite number".to_string());
        }

        match *self {
            FieldDomain::Count { min, max } => {
                if value.fract() != 0.0 {
                    Err(format!("must be a whole number, got {}", value))
                } else if value < min || value > max {
                    Err(format!("must be between {} and {}, got {}", min, max, value))
                } else {
                    Ok(())
                }
            }
            FieldDomain::Range { min, max } => {
                if value < min || value > max {
                    Err(format!("must be between {} and {}, got {}", min, max, value))
                } else {
                    Ok(())
                }
            }
            FieldDomain::NonNegative if value < 0.0 => {
                Err(format!("must not be negative, got {}", value))
            }
            FieldDomain::Positive if value <= 0.0 => {
                Err(format!("must be greater than 0, got {}", value))
            }
            FieldDomain::Flag if value != 0.0 && value != 1.0 => {
                Err(format!("must be 0 or 1, got {}", value))
            }
            _ => Ok(()),
        }
    }
}

/// Three-state classification of one supplied attribute
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Absent,
    Valid(f64),
    Invalid(String),
}

impl FieldInput {
    pub fn classify(field: Field, value: Option<f64>) -> Self {
        match value {
            None => FieldInput::Absent,
            Some(v) => match FieldDomain::for_field(field).check(v) {
                Ok(()) => FieldInput::Valid(v),
                Err(reason) => FieldInput::Invalid(reason),
            },
        }
    }
}

/// Validate a caller attribute map into a canonical attribute set
///
/// `None` values (JSON `null`) count as absent. Names outside the canonical
/// list are ignored.
pub fn validate_attributes(entries: &BTreeMap<String, Option<f64>>) -> Result<AttributeSet> {
    let mut attributes = AttributeSet::new();

    for (name, value) in entries {
        let Some(field) = Field::from_name(name) else {
            debug!("Ignoring unrecognised attribute '{}'", name);
            continue;
        };

        match FieldInput::classify(field, *value) {
            FieldInput::Absent => {}
            FieldInput::Valid(v) => attributes.set(field, v),
            FieldInput::Invalid(reason) => return Err(Error::validation(name.as_str(), reason)),
        }
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, Option<f64>)]) -> BTreeMap<String, Option<f64>> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_classify_three_states() {
        assert_eq!(FieldInput::classify(Field::Guests, None), FieldInput::Absent);
        assert_eq!(FieldInput::classify(Field::Guests, Some(3.0)), FieldInput::Valid(3.0));
        assert!(matches!(
            FieldInput::classify(Field::Guests, Some(0.0)),
            FieldInput::Invalid(_)
        ));
    }

    #[test]
    fn test_zero_is_valid_for_flags() {
        assert_eq!(FieldInput::classify(Field::TvAmenity, Some(0.0)), FieldInput::Valid(0.0));
        assert!(matches!(
            FieldInput::classify(Field::TvAmenity, Some(0.5)),
            FieldInput::Invalid(_)
        ));
    }

    #[test]
    fn test_count_domain() {
        let domain = FieldDomain::for_field(Field::Bedrooms);
        assert!(domain.check(1.0).is_ok());
        assert!(domain.check(15.0).is_ok());
        assert!(domain.check(16.0).is_err());
        assert!(domain.check(-2.0).is_err());
        assert!(domain.check(2.5).is_err());
        assert!(domain.check(f64::NAN).is_err());
    }

    #[test]
    fn test_distance_and_rating_domains() {
        assert!(FieldDomain::for_field(Field::DistanceStadium).check(0.0).is_ok());
        assert!(FieldDomain::for_field(Field::DistanceStadium).check(-0.1).is_err());
        assert!(FieldDomain::for_field(Field::Rating).check(4.7).is_ok());
        assert!(FieldDomain::for_field(Field::Rating).check(5.5).is_err());
        assert!(FieldDomain::for_field(Field::Bathrooms).check(1.5).is_ok());
        assert!(FieldDomain::for_field(Field::RoomDensity).check(0.0).is_err());
    }

    #[test]
    fn test_validate_attributes() {
        let set = validate_attributes(&entries(&[
            ("n_guest", Some(4.0)),
            ("rating", None),
            ("property_type", Some(3.0)),
        ]))
        .unwrap();
        assert_eq!(set.get(Field::Guests), Some(4.0));
        assert!(!set.is_present(Field::Rating));
        assert_eq!(set.to_map().len(), 1);
    }

    #[test]
    fn test_validate_rejects_negative_count() {
        let err = validate_attributes(&entries(&[("n_beds", Some(-1.0))])).unwrap_err();
        match err {
            Error::Validation { field, reason } => {
                assert_eq!(field, "n_beds");
                assert!(reason.contains("between"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
