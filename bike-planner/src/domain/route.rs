//! Routed legs and the assembled walk → bike → walk plan.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::StationCandidate;

/// Travel mode requested from the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Walking,
    Cycling,
}

impl Profile {
    /// OpenRouteService profile slug.
    pub fn as_ors(&self) -> &'static str {
        match self {
            Profile::Walking => "foot-walking",
            Profile::Cycling => "cycling-regular",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Walking => "walking",
            Profile::Cycling => "cycling",
        })
    }
}

/// One routed, mode-homogeneous segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    /// Route shape as returned by the provider (a GeoJSON geometry).
    /// The planner never looks inside it.
    pub geometry: Value,
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RouteLeg {
    pub fn new(geometry: Value, distance_m: f64, duration_s: f64) -> Self {
        Self {
            geometry,
            distance_m,
            duration_s,
        }
    }
}

/// The fastest walk → bike → walk combination found for a request.
///
/// # Invariants
///
/// - `total_duration_s` is the sum of the three legs' durations
/// - `total_distance_m` is the sum of the three legs' distances
///
/// Both are computed in [`RoutePlan::new`]; there is no way to change a leg
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    origin_station: StationCandidate,
    dock_station: StationCandidate,
    walk_to_bike: RouteLeg,
    bike_route: RouteLeg,
    walk_to_dest: RouteLeg,
    total_distance_m: f64,
    total_duration_s: f64,
}

impl RoutePlan {
    pub fn new(
        origin_station: StationCandidate,
        dock_station: StationCandidate,
        walk_to_bike: RouteLeg,
        bike_route: RouteLeg,
        walk_to_dest: RouteLeg,
    ) -> Self {
        let total_distance_m =
            walk_to_bike.distance_m + bike_route.distance_m + walk_to_dest.distance_m;
        let total_duration_s =
            walk_to_bike.duration_s + bike_route.duration_s + walk_to_dest.duration_s;

        Self {
            origin_station,
            dock_station,
            walk_to_bike,
            bike_route,
            walk_to_dest,
            total_distance_m,
            total_duration_s,
        }
    }

    /// Station where the bike is picked up.
    pub fn origin_station(&self) -> &StationCandidate {
        &self.origin_station
    }

    /// Station where the bike is returned.
    pub fn dock_station(&self) -> &StationCandidate {
        &self.dock_station
    }

    pub fn walk_to_bike(&self) -> &RouteLeg {
        &self.walk_to_bike
    }

    pub fn bike_route(&self) -> &RouteLeg {
        &self.bike_route
    }

    pub fn walk_to_dest(&self) -> &RouteLeg {
        &self.walk_to_dest
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn total_duration_s(&self) -> f64 {
        self.total_duration_s
    }

    /// Fraction of the total distance covered by bike, in `[0, 1]`.
    ///
    /// Returns 0 for a zero-length plan.
    pub fn bike_share(&self) -> f64 {
        if self.total_distance_m > 0.0 {
            self.bike_route.distance_m / self.total_distance_m
        } else {
            0.0
        }
    }

    /// The three legs as a GeoJSON `FeatureCollection`, in travel order.
    pub fn to_feature_collection(&self) -> Value {
        let feature = |leg: &RouteLeg, kind: &str, profile: Profile| {
            json!({
                "type": "Feature",
                "geometry": leg.geometry,
                "properties": {
                    "leg": kind,
                    "profile": profile.to_string(),
                    "distance_m": leg.distance_m,
                    "duration_s": leg.duration_s,
                },
            })
        };

        json!({
            "type": "FeatureCollection",
            "features": [
                feature(&self.walk_to_bike, "walk_to_bike", Profile::Walking),
                feature(&self.bike_route, "bike_route", Profile::Cycling),
                feature(&self.walk_to_dest, "walk_to_dest", Profile::Walking),
            ],
        })
    }
}
