//! Great-circle distance between coordinates and its display formatting.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Earth radius used for every distance in the app, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

const FEET_PER_MILE: f64 = 5280.0;
const KM_PER_MILE: f64 = 1.609_344;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN and out-of-range degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is NaN.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::InvalidArgument(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::InvalidArgument(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Haversine distance to `other` in miles.
    #[must_use]
    pub fn distance_miles(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_MILES * c
    }
}

/// Converts kilometres to miles.
#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

/// Renders a distance for display: whole feet under one mile, otherwise
/// miles with one decimal.
///
/// Both branches round half away from zero.
#[must_use]
pub fn format_distance(miles: f64) -> String {
    if miles < 1.0 {
        format!("{} ft", (miles * FEET_PER_MILE).round())
    } else {
        format!("{:.1} mi", (miles * 10.0).round() / 10.0)
    }
}

/// Validates both coordinates and returns the formatted distance between them.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] if any degree value is NaN or
/// outside its valid range.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<String, CoreError> {
    let from = Coordinate::new(lat1, lon1)?;
    let to = Coordinate::new(lat2, lon2)?;
    Ok(format_distance(from.distance_miles(&to)))
}
