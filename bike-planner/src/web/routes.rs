//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use tracing::{debug, error};

use crate::domain::{InvalidLocation, Location, RoutePlan};
use crate::planner::PlanError;
use crate::routing::RoutingProvider;
use crate::stations::{Availability, StationError, StationFinder, StationStore};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S, R>(state: AppState<S, R>) -> Router
where
    S: StationStore + 'static,
    R: RoutingProvider + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/stations/bikes", get(nearest_bikes::<S, R>))
        .route("/stations/docks", get(nearest_docks::<S, R>))
        .route("/route/plan", post(plan_route::<S, R>))
        .route("/route/plan/geojson", post(plan_route_geojson::<S, R>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Nearest stations with at least one bike.
async fn nearest_bikes<S: StationStore, R: RoutingProvider>(
    State(state): State<AppState<S, R>>,
    query: Result<Query<StationSearchRequest>, QueryRejection>,
) -> Result<Json<StationSearchResponse>, AppError> {
    find_stations(&state, query, Availability::Bikes).await
}

/// Nearest stations with at least one free dock.
async fn nearest_docks<S: StationStore, R: RoutingProvider>(
    State(state): State<AppState<S, R>>,
    query: Result<Query<StationSearchRequest>, QueryRejection>,
) -> Result<Json<StationSearchResponse>, AppError> {
    find_stations(&state, query, Availability::Docks).await
}

async fn find_stations<S: StationStore, R: RoutingProvider>(
    state: &AppState<S, R>,
    query: Result<Query<StationSearchRequest>, QueryRejection>,
    availability: Availability,
) -> Result<Json<StationSearchResponse>, AppError> {
    let Query(req) = query.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let location = Location::new(req.lat, req.lon)?;
    let k = state.planner.config().effective_k(req.k);

    let finder = StationFinder::new(state.planner.store());
    let stations = match availability {
        Availability::Bikes => {
            finder
                .nearest_with_bikes(location, k, req.include_stale)
                .await?
        }
        Availability::Docks => {
            finder
                .nearest_with_docks(location, k, req.include_stale)
                .await?
        }
    };

    Ok(Json(StationSearchResponse {
        stations: stations.iter().map(StationResult::from).collect(),
    }))
}

/// Plan a walk → bike → walk route.
async fn plan_route<S: StationStore, R: RoutingProvider>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<PlanRouteRequest>, JsonRejection>,
) -> Result<Json<PlanRouteResponse>, AppError> {
    let plan = plan(&state, payload).await?;
    Ok(Json(PlanRouteResponse::from(&plan)))
}

/// Plan a route and return its legs as a GeoJSON `FeatureCollection`.
async fn plan_route_geojson<S: StationStore, R: RoutingProvider>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<PlanRouteRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let plan = plan(&state, payload).await?;
    Ok(Json(plan.to_feature_collection()))
}

async fn plan<S: StationStore, R: RoutingProvider>(
    state: &AppState<S, R>,
    payload: Result<Json<PlanRouteRequest>, JsonRejection>,
) -> Result<RoutePlan, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let request = req.to_plan_request()?;

    Ok(state.planner.plan(&request).await?)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Plan(PlanError),
    Internal { message: String },
}

impl From<InvalidLocation> for AppError {
    fn from(e: InvalidLocation) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        AppError::Plan(e)
    }
}

impl From<StationError> for AppError {
    fn from(e: StationError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Plan(e) => match e {
                PlanError::NoBikeStation | PlanError::NoDockStation => StatusCode::NOT_FOUND,
                PlanError::NoCredits => StatusCode::TOO_MANY_REQUESTS,
                PlanError::RoutingFailed(_) => StatusCode::BAD_GATEWAY,
                PlanError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
                PlanError::Cancelled | PlanError::Internal { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "INVALID_REQUEST",
            AppError::Plan(e) => e.code().as_str(),
            AppError::Internal { .. } => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::BadRequest { message } => message.clone(),
            AppError::Plan(PlanError::Internal { message, source }) => {
                error!(code, source = ?source, "{message}");
                "internal error".to_string()
            }
            AppError::Plan(e) => e.to_string(),
            AppError::Internal { message } => {
                error!(code, "{message}");
                "internal error".to_string()
            }
        };
        debug!(%status, code, %message, "request failed");

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });
        (status, body).into_response()
    }
}
