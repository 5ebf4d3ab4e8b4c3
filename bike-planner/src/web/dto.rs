//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{InvalidLocation, Location, RouteLeg, RoutePlan, StationCandidate};
use crate::planner::PlanRequest;

/// A point as sent by clients.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointDto {
    pub lat: f64,
    pub lon: f64,
}

impl PointDto {
    pub fn to_location(self) -> Result<Location, InvalidLocation> {
        Location::new(self.lat, self.lon)
    }
}

/// Query string for the nearest-station endpoints.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    pub lat: f64,
    pub lon: f64,

    /// Number of stations wanted (defaults to the planner's default k)
    pub k: Option<usize>,

    /// Also return stations with missing or stale live data
    #[serde(default)]
    pub include_stale: bool,
}

/// A station in search results.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub num_bikes: u32,
    pub num_docks: u32,
    pub online: bool,
    /// Distance from the query point in metres
    pub distance_m: f64,
}

impl From<&StationCandidate> for StationResult {
    fn from(station: &StationCandidate) -> Self {
        Self {
            id: station.id.0,
            name: station.name.clone(),
            latitude: station.latitude(),
            longitude: station.longitude(),
            num_bikes: station.num_bikes,
            num_docks: station.num_docks,
            online: station.online,
            distance_m: station.distance_m,
        }
    }
}

/// Response from the nearest-station endpoints.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationResult>,
}

/// Request to plan a route.
#[derive(Debug, Deserialize)]
pub struct PlanRouteRequest {
    pub start: PointDto,
    pub destination: PointDto,

    /// Candidate stations per side (defaults to the planner's default k)
    pub k: Option<usize>,

    #[serde(default)]
    pub include_stale: bool,
}

impl PlanRouteRequest {
    pub fn to_plan_request(&self) -> Result<PlanRequest, InvalidLocation> {
        let start = self.start.to_location()?;
        let destination = self.destination.to_location()?;

        let mut request =
            PlanRequest::new(start, destination).with_include_stale(self.include_stale);
        if let Some(k) = self.k {
            request = request.with_k(k);
        }
        Ok(request)
    }
}

/// One leg of a planned route.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub distance_m: f64,
    pub duration_s: f64,
    /// GeoJSON geometry of the leg
    pub geometry: Value,
}

impl From<&RouteLeg> for LegResult {
    fn from(leg: &RouteLeg) -> Self {
        Self {
            distance_m: leg.distance_m,
            duration_s: leg.duration_s,
            geometry: leg.geometry.clone(),
        }
    }
}

/// A planned route.
#[derive(Debug, Serialize)]
pub struct PlanRouteResponse {
    pub origin_station: StationResult,
    pub dock_station: StationResult,
    pub walk_to_bike: LegResult,
    pub bike_route: LegResult,
    pub walk_to_dest: LegResult,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
    /// Fraction of the distance covered by bike
    pub bike_share: f64,
}

impl From<&RoutePlan> for PlanRouteResponse {
    fn from(plan: &RoutePlan) -> Self {
        Self {
            origin_station: plan.origin_station().into(),
            dock_station: plan.dock_station().into(),
            walk_to_bike: plan.walk_to_bike().into(),
            bike_route: plan.bike_route().into(),
            walk_to_dest: plan.walk_to_dest().into(),
            total_distance_m: plan.total_distance_m(),
            total_duration_s: plan.total_duration_s(),
            bike_share: plan.bike_share(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::planner::test_support::candidate;

    fn leg(distance_m: f64, duration_s: f64) -> RouteLeg {
        RouteLeg::new(
            json!({"type": "LineString", "coordinates": [[-118.25, 34.0], [-118.25, 34.01]]}),
            distance_m,
            duration_s,
        )
    }

    #[test]
    fn plan_request_from_json() {
        let body = json!({
            "start": {"lat": 34.05, "lon": -118.25},
            "destination": {"lat": 34.04, "lon": -118.26},
            "k": 4,
        });
        let dto: PlanRouteRequest = serde_json::from_value(body).unwrap();
        let request = dto.to_plan_request().unwrap();

        assert_eq!(request.start, Location::new(34.05, -118.25).unwrap());
        assert_eq!(request.destination, Location::new(34.04, -118.26).unwrap());
        assert_eq!(request.k, Some(4));
        assert!(!request.include_stale);
        assert_eq!(request.deadline, None);
    }

    #[test]
    fn plan_request_rejects_bad_coordinates() {
        let body = json!({
            "start": {"lat": 134.05, "lon": -118.25},
            "destination": {"lat": 34.04, "lon": -118.26},
        });
        let dto: PlanRouteRequest = serde_json::from_value(body).unwrap();
        let err = dto.to_plan_request().unwrap_err();

        assert!(err.to_string().starts_with("invalid location (134.05, -118.25)"));
    }

    #[test]
    fn station_query_defaults() {
        let query: StationSearchRequest =
            serde_json::from_value(json!({"lat": 34.05, "lon": -118.25})).unwrap();

        assert_eq!(query.k, None);
        assert!(!query.include_stale);
    }

    #[test]
    fn plan_response_shape() {
        let plan = RoutePlan::new(
            candidate(1, 120.0),
            candidate(2, 80.0),
            leg(200.0, 150.0),
            leg(1600.0, 400.0),
            leg(200.0, 150.0),
        );
        let value = serde_json::to_value(PlanRouteResponse::from(&plan)).unwrap();

        assert_eq!(value["origin_station"]["id"], 1);
        assert_eq!(value["origin_station"]["name"], "Station 1");
        assert_eq!(value["dock_station"]["distance_m"], 80.0);
        assert_eq!(value["bike_route"]["duration_s"], 400.0);
        assert_eq!(value["walk_to_bike"]["geometry"]["type"], "LineString");
        assert_eq!(value["total_distance_m"], 2000.0);
        assert_eq!(value["total_duration_s"], 700.0);
        assert_eq!(value["bike_share"], 0.8);
    }
}
