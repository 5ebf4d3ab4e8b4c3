//! Geographic point type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing a location from out-of-range coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid location ({latitude}, {longitude}): {reason}")]
pub struct InvalidLocation {
    latitude: f64,
    longitude: f64,
    reason: &'static str,
}

/// A WGS84 point.
///
/// Latitude is guaranteed to lie in `[-90, 90]` and longitude in
/// `[-180, 180]`; neither is NaN or infinite.
///
/// # Examples
///
/// ```
/// use bike_planner::domain::Location;
///
/// let berlin = Location::new(52.520008, 13.404954).unwrap();
/// assert_eq!(berlin.latitude(), 52.520008);
///
/// assert!(Location::new(91.0, 0.0).is_err());
/// assert!(Location::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Create a location from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidLocation> {
        let err = |reason| InvalidLocation {
            latitude,
            longitude,
            reason,
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(err("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(err("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(err("longitude must be within [-180, 180]"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Coordinates in `[longitude, latitude]` order, as GeoJSON and most
    /// routing APIs expect them.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Coordinates rounded to `1 / scale` degrees, usable as a hash key.
    ///
    /// With `scale = 1_000_000` two points map to the same key when they
    /// agree to about 0.1 m.
    pub fn quantized(&self, scale: f64) -> (i64, i64) {
        (
            (self.latitude * scale).round() as i64,
            (self.longitude * scale).round() as i64,
        )
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Unvalidated wire form of a location.
#[derive(Serialize, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = InvalidLocation;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.latitude, raw.longitude)
    }
}

impl From<Location> for RawLocation {
    fn from(loc: Location) -> Self {
        RawLocation {
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}
