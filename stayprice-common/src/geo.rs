//! Listing location and distances to the points of interest

use serde::{Deserialize, Serialize};

use crate::schema::Field;
use crate::{Error, Result};

/// Mean Earth radius (km)
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::validation(
                "location.lat",
                format!("must be between -90 and 90, got {}", self.lat),
            ));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::validation(
                "location.lon",
                format!("must be between -180 and 180, got {}", self.lon),
            ));
        }
        Ok(())
    }

    /// Great-circle distance in km (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

/// A landmark whose distance is a model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub name: &'static str,
    pub field: Field,
    pub location: GeoPoint,
}

pub const POINTS_OF_INTEREST: [PointOfInterest; 3] = [
    PointOfInterest {
        name: "City Center",
        field: Field::DistanceCityCenter,
        location: GeoPoint::new(37.9755, 23.7348),
    },
    PointOfInterest {
        name: "Acropolis",
        field: Field::DistanceAcropolis,
        location: GeoPoint::new(37.9715, 23.7257),
    },
    PointOfInterest {
        name: "Panathenaic Stadium",
        field: Field::DistanceStadium,
        location: GeoPoint::new(37.9680, 23.7416),
    },
];

/// Distance from `point` to each point of interest, keyed by its model field
pub fn distances_from(point: &GeoPoint) -> [(Field, f64); 3] {
    POINTS_OF_INTEREST.map(|poi| (poi.field, point.distance_km(&poi.location)))
}
