//! The spatial station store capability.

use std::future::Future;

use crate::domain::{Location, StationCandidate};

use super::error::StationError;

/// What a station must have available to be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// At least one bike to pick up.
    Bikes,
    /// At least one free dock to return a bike to.
    Docks,
}

/// A k-nearest-neighbour station query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationQuery {
    pub location: Location,
    pub k: usize,
    pub availability: Availability,
    /// Include stations without a current live-availability snapshot,
    /// treating them as available.
    pub include_stale: bool,
}

impl StationQuery {
    pub fn new(location: Location, k: usize, availability: Availability) -> Self {
        Self {
            location,
            k,
            availability,
            include_stale: false,
        }
    }

    pub fn with_include_stale(mut self, include_stale: bool) -> Self {
        self.include_stale = include_stale;
        self
    }
}

/// Trait for answering nearest-station queries.
///
/// Implementations return at most `query.k` online stations satisfying
/// `query.availability`, sorted by ascending `distance_m`. An empty result
/// is not an error.
pub trait StationStore: Send + Sync {
    fn nearest_stations(
        &self,
        query: &StationQuery,
    ) -> impl Future<Output = Result<Vec<StationCandidate>, StationError>> + Send;
}
