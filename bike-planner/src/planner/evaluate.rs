//! Exhaustive evaluation of origin/dock pairs.
//!
//! Every `(origin, dock)` pair is routed as three legs: walk from the start
//! to the origin, ride from the origin to the dock, walk from the dock to
//! the destination. The pair with the smallest total duration wins.
//!
//! Pairs are routed concurrently, with at most `max_concurrent` in flight,
//! but results are consumed in enumeration order (origins outer, docks
//! inner). Combined with a strict `<` comparison this makes the first
//! minimum win regardless of which request finished first.

use std::pin::pin;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::domain::{Location, Profile, RouteLeg, RoutePlan, StationCandidate};
use crate::routing::{RoutingError, RoutingProvider};

/// Error from pair evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// One of the candidate lists was empty
    #[error("no candidate stations to route between")]
    NoCandidates,

    /// Every pair failed to produce a complete route
    #[error("could not calculate any route ({pairs} station pairs tried, last error: {last_error})")]
    AllPairsFailed { pairs: usize, last_error: String },
}

/// A fully routed pair, borrowing its stations until it wins.
struct PairRoute<'a> {
    origin: &'a StationCandidate,
    dock: &'a StationCandidate,
    walk_to_bike: RouteLeg,
    bike_route: RouteLeg,
    walk_to_dest: RouteLeg,
}

impl PairRoute<'_> {
    fn total_duration_s(&self) -> f64 {
        self.walk_to_bike.duration_s + self.bike_route.duration_s + self.walk_to_dest.duration_s
    }

    fn into_plan(self) -> RoutePlan {
        RoutePlan::new(
            self.origin.clone(),
            self.dock.clone(),
            self.walk_to_bike,
            self.bike_route,
            self.walk_to_dest,
        )
    }
}

/// Picks the fastest origin/dock combination.
pub struct RouteEvaluator<'a, R: RoutingProvider> {
    provider: &'a R,
    max_concurrent: usize,
}

impl<'a, R: RoutingProvider> RouteEvaluator<'a, R> {
    /// Create an evaluator routing at most `max_concurrent` pairs at once.
    pub fn new(provider: &'a R, max_concurrent: usize) -> Self {
        Self {
            provider,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Route every pair and return the plan with the smallest total duration.
    ///
    /// A pair whose legs cannot all be routed is skipped; failed pairs are
    /// not retried. Only when every pair fails is an error returned.
    pub async fn evaluate(
        &self,
        start: Location,
        dest: Location,
        origins: &[StationCandidate],
        docks: &[StationCandidate],
    ) -> Result<RoutePlan, EvaluationError> {
        if origins.is_empty() || docks.is_empty() {
            return Err(EvaluationError::NoCandidates);
        }

        // Pair futures do nothing until polled; `buffered` polls at most
        // `max_concurrent` of them and yields results in pair order.
        let pending: Vec<_> = origins
            .iter()
            .flat_map(|origin| docks.iter().map(move |dock| (origin, dock)))
            .map(|(origin, dock)| self.route_pair(start, dest, origin, dock))
            .collect();

        let mut outcomes = pin!(stream::iter(pending).buffered(self.max_concurrent));

        let mut best: Option<PairRoute<'_>> = None;
        let mut failed = 0;
        let mut last_error = None;

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(route) => {
                    let total = route.total_duration_s();
                    if best.as_ref().is_none_or(|b| total < b.total_duration_s()) {
                        best = Some(route);
                    }
                }
                Err(e) => {
                    failed += 1;
                    last_error = Some(e.to_string());
                }
            }
        }

        let pairs = origins.len() * docks.len();

        match best {
            Some(route) => {
                debug!(
                    pairs,
                    failed,
                    origin = %route.origin.id,
                    dock = %route.dock.id,
                    duration_s = route.total_duration_s(),
                    "selected fastest pair"
                );
                Ok(route.into_plan())
            }
            None => Err(EvaluationError::AllPairsFailed {
                pairs,
                last_error: last_error.unwrap_or_default(),
            }),
        }
    }

    async fn route_pair<'s>(
        &self,
        start: Location,
        dest: Location,
        origin: &'s StationCandidate,
        dock: &'s StationCandidate,
    ) -> Result<PairRoute<'s>, RoutingError> {
        let legs = futures::try_join!(
            self.provider.route(start, origin.location, Profile::Walking),
            self.provider.route(origin.location, dock.location, Profile::Cycling),
            self.provider.route(dock.location, dest, Profile::Walking),
        );

        let (walk_to_bike, bike_route, walk_to_dest) = legs.inspect_err(|e| {
            warn!(origin = %origin.id, dock = %dock.id, error = %e, "station pair failed");
        })?;

        Ok(PairRoute {
            origin,
            dock,
            walk_to_bike,
            bike_route,
            walk_to_dest,
        })
    }
}
