//! Price aggregation and estimate reports

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::request::Audience;
use crate::schema::Field;
use crate::sweep::FieldSweep;
use crate::{Error, Result};

/// Overall price bounds; `min <= max` always holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Bounds of a non-empty price collection
    pub fn from_prices<I>(prices: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        prices.into_iter().fold(None, |range, price| {
            Some(match range {
                None => PriceRange {
                    min: price,
                    max: price,
                },
                Some(PriceRange { min, max }) => PriceRange {
                    min: min.min(price),
                    max: max.max(price),
                },
            })
        })
    }

    /// Project a nightly range over a stay
    pub fn times(&self, nights: u32) -> Self {
        let n = f64::from(nights);
        PriceRange {
            min: self.min * n,
            max: self.max * n,
        }
    }
}

/// Per-field sweep results, serialized as `{field: {candidate: price}}`
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown(pub Vec<FieldSweep>);

impl Breakdown {
    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|sweep| sweep.field).collect()
    }

    pub fn get(&self, field: Field) -> Option<&FieldSweep> {
        self.0.iter().find(|sweep| sweep.field == field)
    }

    /// Number of prices across all fields
    pub fn len(&self) -> usize {
        self.0.iter().map(|sweep| sweep.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.0
            .iter()
            .flat_map(|sweep| sweep.points.iter().map(|point| point.price))
    }
}

struct Candidates<'a>(&'a FieldSweep);

impl Serialize for Candidates<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.points.len()))?;
        for point in &self.0.points {
            map.serialize_entry(&point.candidate.to_string(), &point.price)?;
        }
        map.end()
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for sweep in &self.0 {
            map.serialize_entry(sweep.field.name(), &Candidates(sweep))?;
        }
        map.end()
    }
}

/// Single price for a fully specified listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointEstimate {
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl PointEstimate {
    pub fn new(price: f64, nights: Option<u32>) -> Self {
        Self {
            price,
            total: nights.map(|n| price * f64::from(n)),
        }
    }
}

/// Price range over the sensitivity sweeps of the missing fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeEstimate {
    pub price_range: PriceRange,
    pub per_field_breakdown: Breakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_range: Option<PriceRange>,
}

impl RangeEstimate {
    /// Reduce all sweep points to one overall range (not per field)
    pub fn from_sweeps(sweeps: Vec<FieldSweep>, nights: Option<u32>) -> Result<Self> {
        let breakdown = Breakdown(sweeps);
        let price_range = PriceRange::from_prices(breakdown.prices())
            .ok_or_else(|| Error::Config("sensitivity sweep produced no prices".to_string()))?;

        Ok(Self {
            price_range,
            total_range: nights.map(|n| price_range.times(n)),
            per_field_breakdown: breakdown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Estimate {
    Point(PointEstimate),
    Range(RangeEstimate),
}

impl Estimate {
    /// Nightly price bounds; equal for a point estimate
    pub fn nightly_range(&self) -> PriceRange {
        match self {
            Estimate::Point(point) => PriceRange {
                min: point.price,
                max: point.price,
            },
            Estimate::Range(range) => range.price_range,
        }
    }

    /// Stay total bounds, when a stay was projected
    pub fn total_range(&self) -> Option<PriceRange> {
        match self {
            Estimate::Point(point) => point.total.map(|total| PriceRange {
                min: total,
                max: total,
            }),
            Estimate::Range(range) => range.total_range,
        }
    }

    /// One-sentence description for the given audience
    pub fn summary(&self, audience: Audience) -> String {
        match (self, audience) {
            (Estimate::Point(point), Audience::Guest) => format!(
                "You can expect a price of {:.2} per night{}.",
                point.price,
                point
                    .total
                    .map(|t| format!(" or {:.2} in total", t))
                    .unwrap_or_default()
            ),
            (Estimate::Point(point), Audience::Host) => format!(
                "The recommended price for your new listing is {:.2} per night.",
                point.price
            ),
            (Estimate::Range(range), Audience::Guest) => format!(
                "You can expect a price from {:.2} to {:.2} per night{}.",
                range.price_range.min,
                range.price_range.max,
                range
                    .total_range
                    .map(|t| format!(" or {:.2} to {:.2} in total", t.min, t.max))
                    .unwrap_or_default()
            ),
            (Estimate::Range(range), Audience::Host) => format!(
                "The recommended price for your new listing ranges from {:.2} to {:.2} per night.",
                range.price_range.min, range.price_range.max
            ),
        }
    }
}

/// Estimate plus presentation fields returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    #[serde(flatten)]
    pub estimate: Estimate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,

    /// Fields filled from defaults, in canonical order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaulted_fields: Vec<Field>,

    pub summary: String,
}

impl EstimateReport {
    pub fn new(
        estimate: Estimate,
        nights: Option<u32>,
        defaulted_fields: Vec<Field>,
        audience: Audience,
    ) -> Self {
        let summary = estimate.summary(audience);
        Self {
            estimate,
            nights,
            defaulted_fields,
            summary,
        }
    }
}
