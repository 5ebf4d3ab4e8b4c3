//! The planning orchestrator.

use std::fmt;
use std::future::{self, Future};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{Location, RoutePlan};
use crate::routing::RoutingProvider;
use crate::stations::{StationFinder, StationStore};

use super::budget::{BudgetWidth, CreditBudgetManager};
use super::config::PlannerConfig;
use super::error::PlanError;
use super::evaluate::RouteEvaluator;

/// The stages a planning call can fail from. An internal failure reports
/// the stage it happened in. Failures during route evaluation are
/// `RoutingFailed`, never internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    Init,
    StationsFetched,
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Named after the work done while leaving the stage.
        f.write_str(match self {
            PlanStage::Init => "fetching stations",
            PlanStage::StationsFetched => "checking routing credits",
        })
    }
}

/// A single planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub start: Location,
    pub destination: Location,
    /// Requested candidates per side, before any budget shrink.
    /// `None` uses the planner's default.
    pub k: Option<usize>,
    /// Also consider stations with missing or stale live data.
    pub include_stale: bool,
    /// Overrides the planner's default deadline.
    pub deadline: Option<Duration>,
}

impl PlanRequest {
    pub fn new(start: Location, destination: Location) -> Self {
        Self {
            start,
            destination,
            k: None,
            include_stale: false,
            deadline: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_include_stale(mut self, include_stale: bool) -> Self {
        self.include_stale = include_stale;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Plans walk → bike → walk routes.
///
/// The planner holds no per-request state; concurrent calls share only the
/// store and the routing provider.
pub struct RoutePlanner<S, R> {
    store: S,
    routing: R,
    config: PlannerConfig,
}

impl<S: StationStore, R: RoutingProvider> RoutePlanner<S, R> {
    pub fn new(store: S, routing: R, config: PlannerConfig) -> Self {
        Self {
            store,
            routing,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan the fastest route for `request`.
    pub async fn plan(&self, request: &PlanRequest) -> Result<RoutePlan, PlanError> {
        self.plan_until(request, future::pending()).await
    }

    /// Plan the fastest route, giving up as soon as `cancel` completes.
    ///
    /// Cancellation and deadline expiry drop every outstanding routing
    /// request; no partial plan is returned.
    pub async fn plan_until<C>(
        &self,
        request: &PlanRequest,
        cancel: C,
    ) -> Result<RoutePlan, PlanError>
    where
        C: Future<Output = ()>,
    {
        let deadline = request.deadline.or(self.config.deadline);

        let bounded = async {
            match deadline {
                Some(limit) => match tokio::time::timeout(limit, self.run(request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(deadline = ?limit, "route planning exceeded its deadline");
                        Err(PlanError::DeadlineExceeded(limit))
                    }
                },
                None => self.run(request).await,
            }
        };

        tokio::select! {
            biased;
            () = cancel => {
                info!("route planning cancelled by caller");
                Err(PlanError::Cancelled)
            }
            result = bounded => result,
        }
    }

    async fn run(&self, request: &PlanRequest) -> Result<RoutePlan, PlanError> {
        let k = self.config.effective_k(request.k);
        debug!(
            start = %request.start,
            destination = %request.destination,
            k,
            include_stale = request.include_stale,
            "planning route"
        );

        let finder = StationFinder::new(&self.store);
        let (origins, docks) = tokio::join!(
            finder.nearest_with_bikes(request.start, k, request.include_stale),
            finder.nearest_with_docks(request.destination, k, request.include_stale),
        );

        let mut origins = origins.map_err(|e| PlanError::internal(PlanStage::Init, e))?;
        if origins.is_empty() {
            info!(start = %request.start, "no station with bikes near start");
            return Err(PlanError::NoBikeStation);
        }
        let mut docks = docks.map_err(|e| PlanError::internal(PlanStage::Init, e))?;
        if docks.is_empty() {
            info!(destination = %request.destination, "no station with docks near destination");
            return Err(PlanError::NoDockStation);
        }

        let budget = CreditBudgetManager::new(&self.routing)
            .remaining_credits(request.start, request.destination)
            .await
            .map_err(|e| PlanError::internal(PlanStage::StationsFetched, e))?;

        match budget.width() {
            BudgetWidth::Exhausted => {
                warn!("no routing credits left");
                return Err(PlanError::NoCredits);
            }
            BudgetWidth::Limited(max_k) => {
                if origins.len() > max_k || docks.len() > max_k {
                    info!(
                        remaining = ?budget.remaining,
                        max_k,
                        origins = origins.len(),
                        docks = docks.len(),
                        "shrinking candidate lists to routing budget"
                    );
                }
                origins.truncate(max_k);
                docks.truncate(max_k);
            }
            BudgetWidth::Unbounded => {}
        }

        let plan = RouteEvaluator::new(&self.routing, self.config.max_concurrent_pairs)
            .evaluate(request.start, request.destination, &origins, &docks)
            .await
            .map_err(|e| {
                warn!(
                    origins = origins.len(),
                    docks = docks.len(),
                    error = %e,
                    "route evaluation failed"
                );
                PlanError::RoutingFailed(e.to_string())
            })?;

        info!(
            origin = %plan.origin_station(),
            dock = %plan.dock_station(),
            duration_s = plan.total_duration_s(),
            distance_m = plan.total_distance_m(),
            "planned route"
        );

        Ok(plan)
    }
}
