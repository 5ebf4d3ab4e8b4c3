//! Planner configuration.

use std::time::Duration;

/// Configuration parameters for route planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Candidate stations per side when a request does not name k.
    pub default_k: usize,

    /// Upper bound on the requested k.
    /// The pair grid, and its routing cost, grows with k².
    pub max_k: usize,

    /// Maximum number of station pairs routed at the same time.
    /// Each pair issues three requests.
    pub max_concurrent_pairs: usize,

    /// Deadline for a whole planning call, unless the request sets one.
    pub deadline: Option<Duration>,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        default_k: usize,
        max_k: usize,
        max_concurrent_pairs: usize,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            default_k,
            max_k,
            max_concurrent_pairs,
            deadline,
        }
    }

    /// The candidate width to use for a request asking for `requested`.
    ///
    /// Always at least 1 and at most `max_k`.
    pub fn effective_k(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_k)
            .clamp(1, self.max_k.max(1))
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_k: 3,
            max_k: 10,
            max_concurrent_pairs: 4,
            deadline: Some(Duration::from_secs(30)),
        }
    }
}
