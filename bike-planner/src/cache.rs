//! Caching layer for routed legs.
//!
//! Routing credits are the scarce resource, and the pair search asks for the
//! same walking legs repeatedly (the walk from the start to an origin
//! station is the same whichever dock it is paired with). Legs are cached by
//! profile and quantised endpoint coordinates.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Location, Profile, RouteLeg};
use crate::routing::{RoutingError, RoutingProvider};

/// Cache key: (profile, quantised from, quantised to).
type LegKey = (Profile, (i64, i64), (i64, i64));

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Coordinates are rounded to `1 / precision` degrees for the key.
    pub precision: f64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_capacity: 10_000,
            precision: 1e6,
        }
    }
}

/// Routing provider with caching.
///
/// Wraps any [`RoutingProvider`]. Only successful legs are cached; quota
/// questions go straight to the inner provider.
pub struct CachedRoutingProvider<R> {
    inner: R,
    legs: MokaCache<LegKey, RouteLeg>,
    precision: f64,
}

impl<R: RoutingProvider> CachedRoutingProvider<R> {
    /// Create a new cached provider.
    pub fn new(inner: R, config: &RouteCacheConfig) -> Self {
        let legs = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            legs,
            precision: config.precision,
        }
    }

    fn key(&self, from: Location, to: Location, profile: Profile) -> LegKey {
        (
            profile,
            from.quantized(self.precision),
            to.quantized(self.precision),
        )
    }

    /// Access the underlying provider for operations that bypass the cache.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: RoutingProvider> RoutingProvider for CachedRoutingProvider<R> {
    async fn route(
        &self,
        from: Location,
        to: Location,
        profile: Profile,
    ) -> Result<RouteLeg, RoutingError> {
        let key = self.key(from, to, profile);

        if let Some(cached) = self.legs.get(&key).await {
            trace!(%from, %to, %profile, "route cache hit");
            return Ok(cached);
        }

        let leg = self.inner.route(from, to, profile).await?;
        self.legs.insert(key, leg.clone()).await;

        Ok(leg)
    }

    async fn remaining_quota(&self) -> Option<u32> {
        self.inner.remaining_quota().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::test_support::ScriptedRouting;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    #[test]
    fn default_config() {
        let config = RouteCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(900));
        assert_eq!(config.max_capacity, 10_000);
        assert_eq!(config.precision, 1e6);
    }

    #[tokio::test]
    async fn repeated_leg_hits_cache() {
        let a = loc(34.05, -118.25);
        let b = loc(34.06, -118.24);
        let inner = ScriptedRouting::new().with_leg(a, b, Profile::Walking, 400.0, 300.0);
        let cached = CachedRoutingProvider::new(inner, &RouteCacheConfig::default());

        let first = cached.route(a, b, Profile::Walking).await.unwrap();
        let second = cached.route(a, b, Profile::Walking).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().request_count(), 1);
    }

    #[tokio::test]
    async fn profile_is_part_of_key() {
        let a = loc(34.05, -118.25);
        let b = loc(34.06, -118.24);
        let inner = ScriptedRouting::new()
            .with_leg(a, b, Profile::Walking, 400.0, 300.0)
            .with_leg(a, b, Profile::Cycling, 400.0, 90.0);
        let cached = CachedRoutingProvider::new(inner, &RouteCacheConfig::default());

        let walk = cached.route(a, b, Profile::Walking).await.unwrap();
        let bike = cached.route(a, b, Profile::Cycling).await.unwrap();

        assert_eq!(walk.duration_s, 300.0);
        assert_eq!(bike.duration_s, 90.0);
        assert_eq!(cached.inner().request_count(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let a = loc(34.05, -118.25);
        let b = loc(34.06, -118.24);
        let cached = CachedRoutingProvider::new(ScriptedRouting::new(), &RouteCacheConfig::default());

        assert!(cached.route(a, b, Profile::Walking).await.is_err());
        assert!(cached.route(a, b, Profile::Walking).await.is_err());
        assert_eq!(cached.inner().request_count(), 2);
    }

    #[tokio::test]
    async fn quota_passes_through() {
        let cached = CachedRoutingProvider::new(
            ScriptedRouting::new().with_quota(Some(77)),
            &RouteCacheConfig::default(),
        );
        assert_eq!(cached.remaining_quota().await, Some(77));
    }
}
