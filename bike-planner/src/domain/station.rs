//! Station snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Location;

/// Identifier of a bike-share station (the operator's kiosk id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A station as returned by a nearest-neighbour query.
///
/// A candidate is a snapshot: `num_bikes`, `num_docks` and `distance_m`
/// describe the station at query time, relative to the query point. It is
/// built fresh by the store for every query and is not meant to be kept
/// beyond a single planning call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCandidate {
    pub id: StationId,
    pub name: String,
    pub location: Location,
    pub num_bikes: u32,
    pub num_docks: u32,
    pub online: bool,
    /// Geodesic distance from the query point, in metres. Never negative.
    pub distance_m: f64,
}

impl StationCandidate {
    pub fn latitude(&self) -> f64 {
        self.location.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude()
    }
}

impl fmt::Display for StationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
