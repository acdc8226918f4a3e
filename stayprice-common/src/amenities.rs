//! Amenity selection
//!
//! Only three amenities are model inputs; the rest are accepted so clients
//! can pass the full selection through unchanged.

use serde::{Deserialize, Serialize};

use crate::schema::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amenity {
    #[serde(rename = "Luxury Items")]
    LuxuryItems,
    #[serde(rename = "TV")]
    Tv,
    #[serde(rename = "Coffee")]
    Coffee,
    #[serde(rename = "Streaming Services")]
    StreamingServices,
    #[serde(rename = "WiFi")]
    WiFi,
    #[serde(rename = "Sound System")]
    SoundSystem,
    #[serde(rename = "Refrigerator")]
    Refrigerator,
    #[serde(rename = "Housekeeping")]
    Housekeeping,
    #[serde(rename = "Cooking Place")]
    CookingPlace,
    #[serde(rename = "Hygiene Products")]
    HygieneProducts,
}

/// Amenities that map onto a model flag
pub const MODEL_AMENITIES: [(Amenity, Field); 3] = [
    (Amenity::LuxuryItems, Field::LuxuryAmenity),
    (Amenity::Tv, Field::TvAmenity),
    (Amenity::Coffee, Field::CoffeeAmenity),
];

/// Model flags implied by a selection, or `None` for an empty selection
///
/// An empty list says nothing about the listing, so the flags stay unknown.
pub fn amenity_flags(selected: &[Amenity]) -> Option<[(Field, f64); 3]> {
    if selected.is_empty() {
        return None;
    }
    Some(MODEL_AMENITIES.map(|(amenity, field)| {
        let flag = if selected.contains(&amenity) { 1.0 } else { 0.0 };
        (field, flag)
    }))
}
