//! Web layer for the bike-share route planner.
//!
//! A JSON API over the station store and the planner. Failures carry the
//! planner's stable error code alongside a human-readable message.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
