//! Derived feature calculator
//!
//! Computes the engineered model inputs from raw attributes. Missing operands
//! and zero denominators yield `None`; defaulting happens later.

use crate::schema::{AttributeSet, Field};

/// Offset added to the bedroom count in the room density denominator.
///
/// Part of the trained feature definition: the model saw
/// `guests / (bedrooms + 1)` during training.
pub const ROOM_DENSITY_BEDROOM_OFFSET: f64 = 1.0;

/// Every point of interest must be strictly closer than this (km)
pub const NEAR_SIGHTS_THRESHOLD_KM: f64 = 2.0;

/// Distance fields that feed the proximity flag
pub const SIGHT_DISTANCE_FIELDS: [Field; 3] = [
    Field::DistanceCityCenter,
    Field::DistanceAcropolis,
    Field::DistanceStadium,
];

/// `guests / (bedrooms + 1)`, or `None` when an operand is unknown
pub fn room_density(guests: Option<f64>, bedrooms: Option<f64>) -> Option<f64> {
    let denominator = bedrooms? + ROOM_DENSITY_BEDROOM_OFFSET;
    if denominator == 0.0 {
        return None;
    }
    let density = guests? / denominator;
    density.is_finite().then_some(density)
}

/// 1 when all distances are below the threshold, 0 otherwise, `None` if any is unknown
pub fn near_all_sights(distances: [Option<f64>; 3]) -> Option<f64> {
    let mut near = true;
    for distance in distances {
        near &= distance? < NEAR_SIGHTS_THRESHOLD_KM;
    }
    Some(if near { 1.0 } else { 0.0 })
}

/// Return a copy of `attributes` with the derived fields recomputed
///
/// A computed value replaces whatever the caller supplied; when the inputs
/// are incomplete the caller's value (if any) is left in place.
pub fn apply(attributes: &AttributeSet) -> AttributeSet {
    let mut derived = *attributes;

    if let Some(density) = room_density(
        attributes.get(Field::Guests),
        attributes.get(Field::Bedrooms),
    ) {
        derived.set(Field::RoomDensity, density);
    }

    if let Some(flag) = near_all_sights(SIGHT_DISTANCE_FIELDS.map(|field| attributes.get(field))) {
        derived.set(Field::NearAllSights, flag);
    }

    derived
}
