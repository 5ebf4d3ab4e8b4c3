//! The routing provider capability.

use std::future::Future;

use crate::domain::{Location, Profile, RouteLeg};

use super::error::RoutingError;

/// Trait for computing routed legs.
///
/// This abstraction allows the planner to be tested without network
/// access and to put a cache in front of a real provider.
pub trait RoutingProvider: Send + Sync {
    /// Route from `from` to `to` with the given travel mode.
    fn route(
        &self,
        from: Location,
        to: Location,
        profile: Profile,
    ) -> impl Future<Output = Result<RouteLeg, RoutingError>> + Send;

    /// Requests left in the provider's quota, if the provider exposes it.
    ///
    /// Best effort: `None` means "unknown", not "unlimited".
    fn remaining_quota(&self) -> impl Future<Output = Option<u32>> + Send;
}
