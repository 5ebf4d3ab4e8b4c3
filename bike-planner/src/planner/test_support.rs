//! In-process fakes for the station store and routing provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::domain::{Location, Profile, RouteLeg, StationCandidate, StationId};
use crate::routing::{RoutingError, RoutingProvider};
use crate::stations::{Availability, StationError, StationQuery, StationStore};

/// Location of test station `id`: stations sit on a line, ~111 m apart.
pub fn station_location(id: u32) -> Location {
    Location::new(34.0 + f64::from(id) * 0.001, -118.25).unwrap()
}

/// A live, online station candidate.
pub fn candidate(id: u32, distance_m: f64) -> StationCandidate {
    StationCandidate {
        id: StationId(id),
        name: format!("Station {id}"),
        location: station_location(id),
        num_bikes: 5,
        num_docks: 5,
        online: true,
        distance_m,
    }
}

/// Station store returning fixed lists.
#[derive(Default)]
pub struct FakeStationStore {
    bikes: Vec<StationCandidate>,
    docks: Vec<StationCandidate>,
    failure: Option<String>,
    queries: Mutex<Vec<StationQuery>>,
}

impl FakeStationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bikes(mut self, stations: Vec<StationCandidate>) -> Self {
        self.bikes = stations;
        self
    }

    pub fn with_docks(mut self, stations: Vec<StationCandidate>) -> Self {
        self.docks = stations;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<StationQuery> {
        self.queries.lock().unwrap().last().copied()
    }
}

impl StationStore for FakeStationStore {
    async fn nearest_stations(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<StationCandidate>, StationError> {
        self.queries.lock().unwrap().push(*query);

        if let Some(message) = &self.failure {
            return Err(StationError::Unavailable(message.clone()));
        }

        let stations = match query.availability {
            Availability::Bikes => &self.bikes,
            Availability::Docks => &self.docks,
        };
        Ok(stations.iter().take(query.k).cloned().collect())
    }
}

type LegKey = (Profile, (i64, i64), (i64, i64));

fn leg_key(from: Location, to: Location, profile: Profile) -> LegKey {
    (profile, from.quantized(1e6), to.quantized(1e6))
}

enum Scripted {
    Leg { distance_m: f64, duration_s: f64 },
    QuotaExhausted,
    ApiError,
}

/// Routing provider answering from a script.
///
/// Legs that were not scripted fail with `NoRoute`. Every request is
/// counted and logged.
#[derive(Default)]
pub struct ScriptedRouting {
    legs: HashMap<LegKey, Scripted>,
    quota: Mutex<Option<u32>>,
    quota_after_request: Option<Option<u32>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(Profile, Location, Location)>>,
    count: AtomicUsize,
}

impl ScriptedRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leg(
        mut self,
        from: Location,
        to: Location,
        profile: Profile,
        distance_m: f64,
        duration_s: f64,
    ) -> Self {
        self.legs.insert(
            leg_key(from, to, profile),
            Scripted::Leg {
                distance_m,
                duration_s,
            },
        );
        self
    }

    /// Script a leg between two test stations, or a station and a point.
    pub fn with_minutes(
        self,
        from: Location,
        to: Location,
        profile: Profile,
        minutes: f64,
    ) -> Self {
        self.with_leg(from, to, profile, minutes * 250.0, minutes * 60.0)
    }

    pub fn with_quota_exhausted(mut self, from: Location, to: Location, profile: Profile) -> Self {
        self.legs
            .insert(leg_key(from, to, profile), Scripted::QuotaExhausted);
        self
    }

    pub fn with_api_error(mut self, from: Location, to: Location, profile: Profile) -> Self {
        self.legs.insert(leg_key(from, to, profile), Scripted::ApiError);
        self
    }

    pub fn with_quota(self, quota: Option<u32>) -> Self {
        *self.quota.lock().unwrap() = quota;
        self
    }

    /// Report `quota` once any request has been made.
    pub fn with_quota_after_request(mut self, quota: Option<u32>) -> Self {
        self.quota_after_request = Some(quota);
        self
    }

    /// Delay every routing response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn request_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(Profile, Location, Location)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RoutingProvider for ScriptedRouting {
    async fn route(
        &self,
        from: Location,
        to: Location,
        profile: Profile,
    ) -> Result<RouteLeg, RoutingError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((profile, from, to));

        if let Some(quota) = self.quota_after_request {
            *self.quota.lock().unwrap() = quota;
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.legs.get(&leg_key(from, to, profile)) {
            Some(Scripted::Leg {
                distance_m,
                duration_s,
            }) => Ok(RouteLeg::new(Value::Null, *distance_m, *duration_s)),
            Some(Scripted::QuotaExhausted) => Err(RoutingError::QuotaExhausted),
            Some(Scripted::ApiError) => Err(RoutingError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
            None => Err(RoutingError::NoRoute { from, to }),
        }
    }

    async fn remaining_quota(&self) -> Option<u32> {
        *self.quota.lock().unwrap()
    }
}
