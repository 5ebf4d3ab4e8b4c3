//! Routing credit budget.
//!
//! Evaluating an `origins × docks` grid costs three routing requests per
//! pair (walk, ride, walk). Before the search runs, the remaining provider
//! quota is turned into the widest square grid it can pay for.
//!
//! The quota is shared and advisory: it is read, not reserved, so a
//! concurrent caller may still exhaust it mid-search. That surfaces as
//! failed pairs in the evaluator.

use tracing::{debug, warn};

use crate::domain::{Location, Profile};
use crate::routing::{RoutingError, RoutingProvider};

/// Routing requests needed to evaluate one origin/dock pair.
pub const REQUESTS_PER_PAIR: u32 = 3;

/// Remaining routing quota at the start of a planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditBudget {
    /// `None` when the provider does not report a quota.
    pub remaining: Option<u32>,
}

/// How far the candidate lists may extend under a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetWidth {
    /// Quota unknown: leave the lists alone.
    Unbounded,
    /// Truncate both lists to this many candidates.
    Limited(usize),
    /// Nothing left to spend.
    Exhausted,
}

impl CreditBudget {
    pub fn unknown() -> Self {
        Self { remaining: None }
    }

    pub fn known(remaining: u32) -> Self {
        Self {
            remaining: Some(remaining),
        }
    }

    pub fn width(&self) -> BudgetWidth {
        match self.remaining {
            None => BudgetWidth::Unbounded,
            Some(0) => BudgetWidth::Exhausted,
            Some(n) => BudgetWidth::Limited(max_k_for_budget(n)),
        }
    }
}

/// Largest k with `3·k² ≤ remaining`, but never less than 1.
///
/// The floor of 1 means a budget of 1 or 2 still allows one pair, which
/// may overrun the quota by up to two requests. A budget of exactly 0 is
/// handled as exhaustion by [`CreditBudget::width`] instead.
///
/// ```
/// use bike_planner::planner::max_k_for_budget;
///
/// assert_eq!(max_k_for_budget(2), 1);
/// assert_eq!(max_k_for_budget(12), 2);
/// assert_eq!(max_k_for_budget(300), 10);
/// ```
pub fn max_k_for_budget(remaining: u32) -> usize {
    (remaining / REQUESTS_PER_PAIR).isqrt().max(1) as usize
}

/// Requests needed to evaluate a full `origins × docks` grid.
pub fn grid_cost(origins: usize, docks: usize) -> u64 {
    origins as u64 * docks as u64 * u64::from(REQUESTS_PER_PAIR)
}

/// Reads the remaining quota from a routing provider.
pub struct CreditBudgetManager<'a, R: RoutingProvider> {
    provider: &'a R,
}

impl<'a, R: RoutingProvider> CreditBudgetManager<'a, R> {
    pub fn new(provider: &'a R) -> Self {
        Self { provider }
    }

    /// Remaining routing credits.
    ///
    /// Some providers only report their quota alongside a response. If the
    /// quota is unknown, one probe request (a walking route from `from` to
    /// `to`, costing one credit) is made and the quota is read again. A
    /// probe rejected for lack of quota yields a budget of zero.
    pub async fn remaining_credits(
        &self,
        from: Location,
        to: Location,
    ) -> Result<CreditBudget, RoutingError> {
        if let Some(remaining) = self.provider.remaining_quota().await {
            return Ok(CreditBudget::known(remaining));
        }

        debug!(%from, %to, "routing quota unknown, sending probe request");

        match self.provider.route(from, to, Profile::Walking).await {
            Ok(_) => {}
            Err(RoutingError::QuotaExhausted) => {
                warn!("probe request rejected: quota exhausted");
                return Ok(CreditBudget::known(0));
            }
            Err(e) => return Err(e),
        }

        let budget = CreditBudget {
            remaining: self.provider.remaining_quota().await,
        };
        debug!(remaining = ?budget.remaining, "routing quota after probe");

        Ok(budget)
    }
}
