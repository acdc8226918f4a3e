//! Caller-facing estimate request

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amenities::Amenity;
use crate::geo::GeoPoint;

/// Who is asking: guests plan a stay, hosts price a new listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Guest,
    Host,
}

/// One estimate request, immutable once handed to the estimator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Attribute values by wire name; `null` means unknown
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<f64>>,

    #[serde(default)]
    pub amenities: Vec<Amenity>,

    /// Listing coordinate; fills distance attributes not given explicitly
    #[serde(default)]
    pub location: Option<GeoPoint>,

    #[serde(default)]
    pub check_in: Option<NaiveDate>,

    #[serde(default)]
    pub check_out: Option<NaiveDate>,

    #[serde(default)]
    pub audience: Audience,
}

impl EstimateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: f64) -> Self {
        self.attributes.insert(name.to_string(), Some(value));
        self
    }

    pub fn with_stay(mut self, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        self.check_in = Some(check_in);
        self.check_out = Some(check_out);
        self
    }

    /// Nights to project a total over
    ///
    /// Hosts price per night, so only guest requests project a total.
    pub fn nights(&self) -> Option<u32> {
        match self.audience {
            Audience::Host => None,
            Audience::Guest => stay_nights(self.check_in, self.check_out),
        }
    }
}

/// Whole days between check-in and check-out, if positive
pub fn stay_nights(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> Option<u32> {
    let days = (check_out? - check_in?).num_days();
    u32::try_from(days).ok().filter(|n| *n > 0)
}
