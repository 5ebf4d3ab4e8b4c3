//! Planner-facing station lookup.

use tracing::debug;

use crate::domain::{Location, StationCandidate};

use super::error::StationError;
use super::store::{Availability, StationQuery, StationStore};

/// Fetches distance-sorted station candidates from a [`StationStore`].
///
/// Whatever the store returns, the finder hands back at most `k`
/// candidates in ascending `distance_m` order. Equal distances keep the
/// store's order.
pub struct StationFinder<'a, S: StationStore> {
    store: &'a S,
}

impl<'a, S: StationStore> StationFinder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The `k` nearest stations to `location` with at least one bike.
    pub async fn nearest_with_bikes(
        &self,
        location: Location,
        k: usize,
        include_stale: bool,
    ) -> Result<Vec<StationCandidate>, StationError> {
        let query =
            StationQuery::new(location, k, Availability::Bikes).with_include_stale(include_stale);
        self.nearest(&query).await
    }

    /// The `k` nearest stations to `location` with at least one free dock.
    pub async fn nearest_with_docks(
        &self,
        location: Location,
        k: usize,
        include_stale: bool,
    ) -> Result<Vec<StationCandidate>, StationError> {
        let query =
            StationQuery::new(location, k, Availability::Docks).with_include_stale(include_stale);
        self.nearest(&query).await
    }

    async fn nearest(&self, query: &StationQuery) -> Result<Vec<StationCandidate>, StationError> {
        if query.k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.store.nearest_stations(query).await?;
        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        candidates.truncate(query.k);

        debug!(
            location = %query.location,
            availability = ?query.availability,
            k = query.k,
            found = candidates.len(),
            "fetched station candidates"
        );

        Ok(candidates)
    }
}
