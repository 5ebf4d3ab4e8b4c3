//! Domain types for the bike route planner.
//!
//! These are plain values created per planning request. Types that carry
//! invariants enforce them at construction time, so code receiving them can
//! trust their validity.

mod location;
mod route;
mod station;

pub use location::{InvalidLocation, Location};
pub use route::{Profile, RouteLeg, RoutePlan};
pub use station::{StationCandidate, StationId};
