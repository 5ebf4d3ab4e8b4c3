//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::RoutePlanner;

/// Shared application state.
///
/// The planner owns the station store and the routing provider; handlers
/// reach both through it.
pub struct AppState<S, R> {
    pub planner: Arc<RoutePlanner<S, R>>,
}

impl<S, R> AppState<S, R> {
    pub fn new(planner: RoutePlanner<S, R>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
        }
    }
}
