//! Turn-by-turn routing.
//!
//! The planner talks to a routing backend through [`RoutingProvider`].
//! [`OrsClient`] implements it against the OpenRouteService directions API.
//!
//! Key characteristics of OpenRouteService:
//! - Every directions request costs one credit from a per-key daily quota
//! - The remaining quota is only visible in the `x-ratelimit-remaining`
//!   header of a response, so it is unknown until a first request is made
//! - Coordinates are `[longitude, latitude]`

mod client;
mod error;
mod provider;
mod types;

pub use client::{OrsClient, OrsConfig};
pub use error::RoutingError;
pub use provider::RoutingProvider;
pub use types::{
    DirectionsFeature, DirectionsRequest, DirectionsResponse, FeatureProperties, RouteSummary,
};
