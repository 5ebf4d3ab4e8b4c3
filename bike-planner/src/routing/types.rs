//! OpenRouteService directions wire types.
//!
//! Only the fields the planner uses are modelled; the rest of the response
//! (segments, instructions, way points) is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Location, RouteLeg};

/// Body of `POST /v2/directions/{profile}/geojson`.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionsRequest {
    pub coordinates: Vec<[f64; 2]>,
    /// Snapping radius per coordinate; `-1` means unlimited.
    pub radiuses: Vec<i32>,
}

impl DirectionsRequest {
    /// A two-point request with unlimited snapping radius.
    pub fn between(from: Location, to: Location) -> Self {
        Self {
            coordinates: vec![from.lon_lat(), to.lon_lat()],
            radiuses: vec![-1, -1],
        }
    }
}

/// GeoJSON `FeatureCollection` returned by the directions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub features: Vec<DirectionsFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsFeature {
    #[serde(default)]
    pub geometry: Value,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub summary: RouteSummary,
}

/// Route totals. ORS omits both fields for a zero-length route.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RouteSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

impl DirectionsResponse {
    /// The first (best) route as a leg, if the provider returned one.
    pub fn into_leg(self) -> Option<RouteLeg> {
        let feature = self.features.into_iter().next()?;
        let summary = feature.properties.summary;
        Some(RouteLeg::new(feature.geometry, summary.distance, summary.duration))
    }
}
