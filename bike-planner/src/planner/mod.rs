//! Walk → bike → walk route planning.
//!
//! This module answers: "what is the fastest way from here to there if I
//! walk to a station with a bike, ride to a station with a free dock, and
//! walk the rest?"
//!
//! The search is exhaustive over a small candidate grid. The k nearest
//! stations with bikes around the start are paired with the k nearest
//! stations with docks around the destination, and every pair is routed.
//! Routing requests consume a finite provider quota, so k is shrunk to what
//! the remaining quota can pay for before the search starts.

mod budget;
mod config;
mod error;
mod evaluate;
mod plan;

#[cfg(test)]
pub(crate) mod test_support;

pub use budget::{
    BudgetWidth, CreditBudget, CreditBudgetManager, REQUESTS_PER_PAIR, grid_cost,
    max_k_for_budget,
};
pub use config::PlannerConfig;
pub use error::{ErrorCode, PlanError};
pub use evaluate::{EvaluationError, RouteEvaluator};
pub use plan::{PlanRequest, PlanStage, RoutePlanner};
