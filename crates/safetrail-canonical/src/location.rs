use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Disclosure granularity chosen by the user, independent of audit mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Precision {
    /// Full-resolution coordinates.
    Exact,
    /// Coordinates degraded to a neighborhood-level area.
    Approximate,
    /// Coordinates degraded to a city-level area.
    General,
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::Approximate => write!(f, "APPROXIMATE"),
            Self::General => write!(f, "GENERAL"),
        }
    }
}

/// Validated coordinates plus the precision they were disclosed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    /// Latitude in degrees, within [-90, 90].
    pub lat: f64,
    /// Longitude in degrees, within [-180, 180].
    pub lng: f64,
    /// Disclosure precision.
    pub precision: Precision,
}

impl LocationData {
    /// Constructs location data, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lng: f64, precision: Precision) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) || !lat.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "lat",
                value: lat,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&lng) || !lng.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "lng",
                value: lng,
                min: -180.0,
                max: 180.0,
            });
        }
        Ok(Self {
            lat,
            lng,
            precision,
        })
    }

    /// Re-validates a deserialized value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::new(self.lat, self.lng, self.precision).map(|_| ())
    }
}
